//! Formation layout
//!
//! Pure function of field width and level: the same inputs always give the
//! same grid, so a level can be regenerated at any time.

use glam::IVec2;

use crate::consts::{FINAL_LEVEL, INVADER_SIZE};

/// Gap between the field edge and the formation (left and top)
pub const FORMATION_MARGIN: i32 = 20;
/// Vertical gap between rows
pub const ROW_GAP: i32 = 20;
/// Fields narrower than this use the compact horizontal pitch
pub const COMPACT_WIDTH_THRESHOLD: i32 = 480;
/// Horizontal distance between invader origins on wide fields
pub const WIDE_PITCH: i32 = INVADER_SIZE * 2;
/// Horizontal distance between invader origins on compact fields
pub const COMPACT_PITCH: i32 = INVADER_SIZE + 20;
/// Column cap on compact fields: what the narrowest wide field holds, so the
/// count never drops when a field crosses the threshold
pub const COMPACT_MAX_COLUMNS: u32 = columns_at_pitch(COMPACT_WIDTH_THRESHOLD, WIDE_PITCH);

/// Columns that fit with the margin kept free on both sides (at least one)
const fn columns_at_pitch(field_width: i32, pitch_x: i32) -> u32 {
    let usable = field_width.saturating_sub(2 * FORMATION_MARGIN);
    if usable < INVADER_SIZE {
        1
    } else {
        ((usable - INVADER_SIZE) / pitch_x + 1) as u32
    }
}

/// Rows in the formation for a level
pub fn rows_for_level(level: u8) -> u32 {
    if level >= FINAL_LEVEL { 4 } else { 3 }
}

/// Grid dimensions computed for a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormationLayout {
    pub columns: u32,
    pub rows: u32,
    pub pitch: IVec2,
    pub origin: IVec2,
}

impl FormationLayout {
    pub fn for_field(field_width: i32, level: u8) -> Self {
        let field_width = field_width.max(0);
        let (pitch_x, columns) = if field_width < COMPACT_WIDTH_THRESHOLD {
            let columns = columns_at_pitch(field_width, COMPACT_PITCH).min(COMPACT_MAX_COLUMNS);
            (COMPACT_PITCH, columns)
        } else {
            (WIDE_PITCH, columns_at_pitch(field_width, WIDE_PITCH))
        };

        Self {
            columns,
            rows: rows_for_level(level),
            pitch: IVec2::new(pitch_x, INVADER_SIZE + ROW_GAP),
            origin: IVec2::splat(FORMATION_MARGIN),
        }
    }

    /// Invader positions, one row at a time, left to right
    pub fn positions(&self) -> impl Iterator<Item = IVec2> + '_ {
        (0..self.rows).flat_map(move |row| {
            (0..self.columns)
                .map(move |col| self.origin + self.pitch * IVec2::new(col as i32, row as i32))
        })
    }
}

/// Generate the formation for a level
pub fn generate_formation(field_width: i32, level: u8) -> Vec<IVec2> {
    let layout = FormationLayout::for_field(field_width, level);
    log::debug!(
        "Formation for width {} level {}: {}x{} pitch {:?}",
        field_width,
        level,
        layout.columns,
        layout.rows,
        layout.pitch
    );
    layout.positions().collect()
}
