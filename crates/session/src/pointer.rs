use scene::EntityId;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PointerKind {
    /// Primary button.
    Click,
    /// Secondary button / long press.
    ContextMenu,
}

/// What a pointer event asks the session to do.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Command {
    /// Raise the marker to the top of the paint order, opening its popup if
    /// it has one.
    BringToFront { entity: EntityId, open_popup: bool },
    ToggleCompletion(EntityId),
}
