use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Wizard steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ModalStep {
    #[default]
    Index,
    Sku,
    Barcode,
    AddFormImages,
    AddFormDetails,
    EditFormImages,
    EditForm,
    View,
}

/// What `Next` does from a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextAction {
    Goto(ModalStep),
    LookupSku,
    LookupBarcode,
    /// Move to the step only when the draft has at least one photo
    RequireImages(ModalStep),
    CreateSneaker,
    UpdateSneaker,
    BrowseNext,
}

/// What `Back` does from a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackAction {
    Goto(ModalStep),
    DiscardDraft(ModalStep),
    BrowsePrevious,
    Close,
}

impl ModalStep {
    pub const ALL: [ModalStep; 8] = [
        ModalStep::Index,
        ModalStep::Sku,
        ModalStep::Barcode,
        ModalStep::AddFormImages,
        ModalStep::AddFormDetails,
        ModalStep::EditFormImages,
        ModalStep::EditForm,
        ModalStep::View,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModalStep::Index => "index",
            ModalStep::Sku => "sku",
            ModalStep::Barcode => "barcode",
            ModalStep::AddFormImages => "addFormImages",
            ModalStep::AddFormDetails => "addFormDetails",
            ModalStep::EditFormImages => "editFormImages",
            ModalStep::EditForm => "editForm",
            ModalStep::View => "view",
        }
    }

    pub fn on_next(&self) -> NextAction {
        match self {
            ModalStep::Index => NextAction::Goto(ModalStep::Sku),
            ModalStep::Sku => NextAction::LookupSku,
            ModalStep::Barcode => NextAction::LookupBarcode,
            ModalStep::AddFormImages => NextAction::RequireImages(ModalStep::AddFormDetails),
            ModalStep::AddFormDetails => NextAction::CreateSneaker,
            ModalStep::EditFormImages => NextAction::RequireImages(ModalStep::EditForm),
            ModalStep::EditForm => NextAction::UpdateSneaker,
            ModalStep::View => NextAction::BrowseNext,
        }
    }

    pub fn on_back(&self) -> BackAction {
        match self {
            ModalStep::Index => BackAction::Close,
            ModalStep::Sku | ModalStep::Barcode => BackAction::Goto(ModalStep::Index),
            ModalStep::AddFormImages => BackAction::DiscardDraft(ModalStep::Index),
            ModalStep::AddFormDetails => BackAction::Goto(ModalStep::AddFormImages),
            ModalStep::EditFormImages => BackAction::Goto(ModalStep::EditForm),
            ModalStep::EditForm => BackAction::Goto(ModalStep::View),
            ModalStep::View => BackAction::BrowsePrevious,
        }
    }

    /// Steps that can only be entered with write access
    pub fn requires_write_access(&self) -> bool {
        matches!(
            self,
            ModalStep::AddFormImages
                | ModalStep::AddFormDetails
                | ModalStep::EditFormImages
                | ModalStep::EditForm
        )
    }

    /// Edit steps additionally require owning the current sneaker
    pub fn requires_ownership(&self) -> bool {
        matches!(self, ModalStep::EditFormImages | ModalStep::EditForm)
    }

    /// Steps that operate on an existing sneaker
    pub fn requires_record(&self) -> bool {
        matches!(
            self,
            ModalStep::EditFormImages | ModalStep::EditForm | ModalStep::View
        )
    }
}

impl std::fmt::Display for ModalStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModalStep {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModalStep::ALL
            .iter()
            .copied()
            .find(|step| step.as_str() == s)
            .ok_or_else(|| format!("unknown wizard step '{}'", s))
    }
}
