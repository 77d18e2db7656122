use std::path::{Path, PathBuf};

use kb_file_ext::ResourceType;

/// A file somebody wants a preview of, as handed over by the importer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
	pub path: PathBuf,
	pub resource_type: ResourceType,
	pub mime_type: String,
	/// Shown on placeholders, the file name unless told otherwise
	pub original_name: String,
}

impl SourceFile {
	pub fn new(
		path: impl Into<PathBuf>,
		resource_type: impl Into<ResourceType>,
		mime_type: impl Into<String>,
	) -> Self {
		let path = path.into();
		let original_name = file_name(&path);

		Self {
			path,
			resource_type: resource_type.into(),
			mime_type: mime_type.into(),
			original_name,
		}
	}

	/// Importers usually store files under generated names, this keeps the one the user
	/// knows
	#[must_use]
	pub fn with_original_name(mut self, original_name: impl Into<String>) -> Self {
		self.original_name = original_name.into();
		self
	}
}

fn file_name(path: &Path) -> String {
	path.file_name()
		.map(|name| name.to_string_lossy().into_owned())
		.unwrap_or_default()
}
