// File layout constants
pub const SECTION_COUNT: usize = 30;
pub const COUNT_WIDTH: usize = 4;
pub const RECORD_WIDTH: usize = 4;

// The game's own writer leaves 12 zero bytes after the 26th section. Nothing
// on the read side accounts for them; they are emitted as an opaque run.
pub const PADDED_SECTION_INDEX: usize = 25;
pub const SECTION_PADDING: [u8; 12] = [0; 12];

pub const DEFAULT_FILE_NAME: &str = "9999.dat";

// --- Display name tables ---

pub const SECTION_NAMES: [&str; SECTION_COUNT] = [
    "Fighting Stances",
    "Taunts",
    "Finishers",
    "Standing Front Grapples",
    "Standing Front Grapples Groggy",
    "Standing Strikes",
    "Standing Back Grapples",
    "Ground Upper Grapples",
    "Ground Lower Grapples",
    "Ground Strikes",
    "Rope Down Grapples",
    "Turnbuckle Upper Front Grapples",
    "Turnbuckle Upper Back Grapples",
    "Turnbuckle Lower Grapples",
    "Turnbuckle Lower Running Strikes",
    "Aerial Strikes Stand",
    "Aerial Strikes Down",
    "Jump Down Over Strikes",
    "Jump Off Rope Strikes",
    "Running Front Grapples",
    "Running Strikes",
    "Running Back Grapples",
    "Running Counter Grapples",
    "Double Team Moves",
    "Favorites",
    "Winning Moves",
    "Ring In Moves",
    "Ring Out Moves",
    "Combo Strikes Basic",
    "Combo Strikes Final",
];

pub fn section_name(index: usize) -> Option<&'static str> {
    SECTION_NAMES.get(index).copied()
}

/// One-based display label, e.g. `01 Fighting Stances`.
pub fn section_label(index: usize) -> String {
    match section_name(index) {
        Some(name) => format!("{:02} {name}", index + 1),
        None => format!("{:02}", index + 1),
    }
}
