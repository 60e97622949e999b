//! Client-credentials authentication gate for HTTP pipelines: cached bearer tokens, HTTPS-only
//! token exchange, and bounded re-authentication in one crate.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod ext;
pub mod gate;
#[cfg(feature = "reqwest")] pub mod http;
pub mod obs;
pub mod token;

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use tokio_util::sync::CancellationToken;
pub use url;
#[cfg(test)] use {color_eyre as _, flate2 as _, httpmock as _};
