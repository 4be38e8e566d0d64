use tether_inventory::ManifestError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
	#[error(transparent)]
	Manifest(#[from] ManifestError),
	#[error("application identifier must not be empty")]
	EmptyIdentifier,
}
