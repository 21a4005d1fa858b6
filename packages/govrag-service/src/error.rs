pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Retrieval failed: {message}")]
	Retrieval { message: String },
	#[error("Generation failed: {message}")]
	Generation { message: String },
}
impl Error {
	pub(crate) fn retrieval(err: govrag_providers::Error) -> Self {
		let message = if err.is_timeout() {
			"Knowledge base request timed out.".to_string()
		} else {
			err.to_string()
		};

		Self::Retrieval { message }
	}

	pub(crate) fn generation(err: govrag_providers::Error) -> Self {
		let message = if err.is_timeout() {
			"Generation request timed out.".to_string()
		} else {
			err.to_string()
		};

		Self::Generation { message }
	}
}
