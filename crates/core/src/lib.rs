//! Certificate Order Core - Domain library for the certificate order form.
//!
//! This crate provides everything the order wizard needs that does not touch
//! the network or the clock. It is shared by:
//! - `storefront` - the web server hosting the wizard screens
//! - `integration-tests` - end-to-end flow tests
//!
//! # Architecture
//!
//! The core crate contains only types and state transitions - no I/O, no HTTP
//! clients. Timestamps are passed in, and work that needs I/O is split into
//! `begin_*`/`complete_*` pairs on [`OrderWizard`].
//!
//! # Modules
//!
//! - [`types`] - Newtypes for product ids, prices, phone numbers and statuses
//! - [`catalog`] - The fixed print size catalog
//! - [`country`] - Shipping destinations
//! - [`image`] - Uploaded image encoded as a data URL
//! - [`draft`] - The order being collected
//! - [`wizard`] - Step navigation, gating and submission sequencing
//! - [`payload`] - The JSON body sent to the order endpoint

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod country;
pub mod draft;
pub mod image;
pub mod payload;
pub mod types;
pub mod wizard;

pub use catalog::{Catalog, ProductIdOverrides, SizeCode, SizeOption, UnknownSizeCode};
pub use country::{COUNTRIES, is_supported_country};
pub use draft::{Field, OrderDraft, PersonalData, ShippingData};
pub use image::{ImageError, ImageUpload};
pub use payload::{ImagePayload, OrderPayload};
pub use types::*;
pub use wizard::{FieldError, GateError, IntakeTicket, OrderWizard, WizardError};
