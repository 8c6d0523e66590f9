//! Sneaker acquisition and edit wizard
//!
//! [`ModalStateMachine`] owns the wizard state and is the only component that
//! changes it. Steps and their transitions are described by [`ModalStep`];
//! the host supplies the session, toasts and translations through the traits
//! in [`collaborators`].
//!
//! ```text
//!   index ──Next──▶ sku ──lookup──▶ addFormImages ──▶ addFormDetails ──create──▶ view
//!     │  └─scan──▶ barcode ──lookup──┘      ▲                                   │
//!     └──manual entry────────────────────────┘        editFormImages ◀─▶ editForm ◀┘
//! ```

pub mod collaborators;
pub mod machine;
pub mod state;
pub mod step;

pub use collaborators::{Localizer, NotificationKind, Notifier, SessionProvider, StaticLocalizer};
pub use machine::{ModalStateMachine, WizardDeps};
pub use state::{WizardSnapshot, WizardState};
pub use step::{BackAction, ModalStep, NextAction};
