//! Domain models for the sneaker catalogue
//!
//! `SneakerDraft` (form values) and `SneakerRecord` (persisted row) are kept
//! as separate types; a draft only becomes a record through the explicit
//! conversions in [`draft`].

pub mod draft;
pub mod photo;
pub mod sneaker;

pub use draft::{DraftEdit, SizePair, SneakerDraft, SneakerField};
pub use photo::Photo;
pub use sneaker::{
    Brand, FetchedSneakerDraft, Gender, NewSneaker, SneakerPatch, SneakerRecord, SneakerStatus,
};
