use derive_more::Display;

use crate::path::PrimPath;
use crate::prim::PrimPurpose;

/// A single authoring operation on a stage
///
/// Values are carried as user-entered text and converted to the attribute's
/// value type when the edit is applied.
#[derive(Debug, Clone, PartialEq, Display)]
pub enum StageEdit {
    #[display(fmt = "set kind of {} to {:?}", path, kind)]
    SetKind { path: PrimPath, kind: String },

    #[display(fmt = "set purpose of {} to {}", path, purpose)]
    SetPurpose { path: PrimPath, purpose: PrimPurpose },

    #[display(fmt = "set {}.{} = {}", path, name, value)]
    SetAttribute {
        path: PrimPath,
        name: String,
        value: String,
    },

    #[display(fmt = "add attribute {}.{}", path, name)]
    AddAttribute {
        path: PrimPath,
        name: String,
        value: String,
    },

    #[display(fmt = "add primvar {}.primvars:{}", path, name)]
    AddPrimvar {
        path: PrimPath,
        name: String,
        value: String,
    },

    #[display(fmt = "remove {}.{}", path, name)]
    RemoveAttribute { path: PrimPath, name: String },

    #[display(fmt = "set {}.{} at time {} = {}", path, name, time, value)]
    SetTimeSample {
        path: PrimPath,
        name: String,
        time: f64,
        value: String,
    },

    #[display(fmt = "remove sample {}.{} at time {}", path, name, time)]
    RemoveTimeSample {
        path: PrimPath,
        name: String,
        time: f64,
    },

    #[display(fmt = "select variant {}:{} on {}", set, variant, path)]
    SelectVariant {
        path: PrimPath,
        set: String,
        variant: String,
    },

    #[display(fmt = "load payload {}", path)]
    LoadPayload { path: PrimPath },

    #[display(fmt = "unload payload {}", path)]
    UnloadPayload { path: PrimPath },
}

impl StageEdit {
    /// The prim this edit authors on
    pub fn target(&self) -> &PrimPath {
        match self {
            StageEdit::SetKind { path, .. }
            | StageEdit::SetPurpose { path, .. }
            | StageEdit::SetAttribute { path, .. }
            | StageEdit::AddAttribute { path, .. }
            | StageEdit::AddPrimvar { path, .. }
            | StageEdit::RemoveAttribute { path, .. }
            | StageEdit::SetTimeSample { path, .. }
            | StageEdit::RemoveTimeSample { path, .. }
            | StageEdit::SelectVariant { path, .. }
            | StageEdit::LoadPayload { path }
            | StageEdit::UnloadPayload { path } => path,
        }
    }

    /// Whether the edit can change the composed child hierarchy
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            StageEdit::SelectVariant { .. }
                | StageEdit::LoadPayload { .. }
                | StageEdit::UnloadPayload { .. }
        )
    }
}
