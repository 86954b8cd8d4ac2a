//! Gatekit — multi-provider identity SDK
//!
//! One connection/session abstraction over two provider families:
//! decentralized (injected wallet-style signers identified by a
//! chain/account pair) and centralized (classic account/OAuth-style
//! identity). Applications authenticate through either family without
//! branching on it.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use gatekit::prelude::*;
//!
//! # async fn example() -> gatekit::error::Result<()> {
//! let config = GatekitConfig::from_env();
//! config.set_project_identifier("my-project");
//!
//! let app = AuthenticationApp::new(
//!     AuthenticationAppOptions::builder()
//!         .config(config.clone())
//!         .storage(Arc::new(MemoryStorage::new()) as Arc<dyn Storage>)
//!         .channels(Arc::new(StandardChannelFactory::new(config.project_base_url()))
//!             as Arc<dyn ChannelFactory>)
//!         .build(),
//! );
//!
//! let started = app.start_authentication("metamask").await?;
//! match started.outcome {
//!     FrameOutcome::Connected { session } => println!("connected as {}", session.uid),
//!     FrameOutcome::AuthorizationRequest { params } => println!("redirect with {params:?}"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod app;
pub mod backend;
pub mod channel;
pub mod config;
pub mod error;
pub mod frame;
pub mod prelude;
pub mod registry;
pub mod resolver;
pub mod storage;
pub mod types;
pub mod util;
