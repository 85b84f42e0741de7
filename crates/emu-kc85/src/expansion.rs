//! KC85 expansion module slots.
//!
//! The KC85 base unit has two module slots (`$08` and `$0C`). The driver
//! seats a 16 KB RAM module and an empty placeholder there on power-on,
//! without disturbing anything the user has already plugged in. Modules
//! stay seated across power cycles, like cards in the real machine.

/// Kinds of expansion modules the driver knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleKind {
    /// Empty slot marker, shown as an insertable placeholder.
    None,
    /// M022 16 KB RAM expander.
    M022,
}

/// Registration data for a module type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleSpec {
    pub kind: ModuleKind,
    pub name: &'static str,
    pub help: &'static str,
    /// Default control byte (address bits of the mapped window).
    pub control: u8,
    /// RAM size in bytes; zero for non-memory modules.
    pub size: usize,
}

/// Base-unit slot addresses.
pub const SLOT_08: u8 = 0x08;
pub const SLOT_0C: u8 = 0x0C;

/// Module types registered with a KC85 core at construction.
pub const REGISTERED_MODULES: [ModuleSpec; 2] = [
    ModuleSpec {
        kind: ModuleKind::None,
        name: "NO MODULE",
        help: "Click to insert module!",
        control: 0x00,
        size: 0,
    },
    ModuleSpec {
        kind: ModuleKind::M022,
        name: "M022 EXPANDER RAM",
        help: "nohelp",
        control: 0xC0,
        size: 0x4000,
    },
];

/// What each base-unit slot receives on power-on if it is empty.
pub const DEFAULT_SLOTS: [(u8, ModuleKind); 2] =
    [(SLOT_08, ModuleKind::M022), (SLOT_0C, ModuleKind::None)];
