use crate::Key;

/// Translates an X11 keysym into a [`Key`] in the virtual-key code space.
///
/// Letters fold to upper case so that `a` and `A` are the same key. Keysyms
/// without an equivalent map to code 0.
pub fn key_from_keysym(keysym: u64) -> Key {
    let code = match keysym {
        0x61..=0x7A => keysym - 0x61 + 0x41,
        0x41..=0x5A | 0x30..=0x39 => keysym,
        0x20 => 0x20,

        0xFF08 => 0x08,          // BackSpace
        0xFF09 => 0x09,          // Tab
        0xFF0D | 0xFF8D => 0x0D, // Return, KP_Enter
        0xFF13 => 0x13,          // Pause
        0xFF14 => 0x91,          // Scroll_Lock
        0xFF1B => 0x1B,          // Escape
        0xFFFF => 0x2E,          // Delete

        0xFF50 => 0x24, // Home
        0xFF51 => 0x25, // Left
        0xFF52 => 0x26, // Up
        0xFF53 => 0x27, // Right
        0xFF54 => 0x28, // Down
        0xFF55 => 0x21, // Page_Up
        0xFF56 => 0x22, // Page_Down
        0xFF57 => 0x23, // End
        0xFF61 => 0x2C, // Print
        0xFF63 => 0x2D, // Insert
        0xFF67 => 0x5D, // Menu
        0xFF7F => 0x90, // Num_Lock

        0xFFAA => 0x6A, // KP_Multiply
        0xFFAB => 0x6B, // KP_Add
        0xFFAD => 0x6D, // KP_Subtract
        0xFFAE => 0x6E, // KP_Decimal
        0xFFAF => 0x6F, // KP_Divide
        0xFFB0..=0xFFB9 => keysym - 0xFFB0 + 0x60,

        0xFFBE..=0xFFC9 => keysym - 0xFFBE + 0x70, // F1 to F12

        0xFFE1 | 0xFFE2 => 0x10, // Shift_L, Shift_R
        0xFFE3 | 0xFFE4 => 0x11, // Control_L, Control_R
        0xFFE5 => 0x14,          // Caps_Lock
        0xFFE9 | 0xFFEA => 0x12, // Alt_L, Alt_R
        0xFFEB => 0x5B,          // Super_L
        0xFFEC => 0x5C,          // Super_R

        0x3B => 0xBA, // semicolon
        0x3D => 0xBB, // equal
        0x2C => 0xBC, // comma
        0x2D => 0xBD, // minus
        0x2E => 0xBE, // period
        0x2F => 0xBF, // slash
        0x60 => 0xC0, // grave
        0x5B => 0xDB, // bracketleft
        0x5C => 0xDC, // backslash
        0x5D => 0xDD, // bracketright
        0x27 => 0xDE, // apostrophe

        _ => 0,
    };

    Key::from_code(code as u16)
}
