//! Context usage bar.
//!
//! A bar of `n` cells is split into contiguous zones: used (a dim cached
//! prefix followed by a bright fresh run), free, and reserved. Any nonzero
//! quantity gets at least one cell, then is clamped to whatever budget is left.

use crate::settings::CompactionSettings;
use crate::style::{DIM_GREEN, DIM_RED, DIM_WHITE, DIM_YELLOW, GREEN, RED, RESET, YELLOW};

const USED_GLYPH: char = '■';
const FREE_GLYPH: char = '□';
const RESERVED_GLYPH: char = '▨';

/// Token counts feeding one bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BarUsage {
    pub total_tokens: u64,
    pub fresh_tokens: u64,
    pub cached_tokens: u64,
}

/// Cell counts per zone. `cached + fresh + free + reserved` always equals the budget.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BarAllocation {
    pub cached: usize,
    pub fresh: usize,
    pub free: usize,
    pub reserved: usize,
}

/// `tokens` scaled to `cells`, rounded down, but never 0 for nonzero tokens.
fn scale(tokens: u64, cells: usize, total: u64) -> usize {
    if tokens == 0 || cells == 0 {
        return 0;
    }
    let scaled = u128::from(tokens) * cells as u128 / u128::from(total.max(1));
    // scaled <= cells because callers clamp tokens to total
    (scaled as usize).max(1)
}

impl BarAllocation {
    pub fn compute(cells: usize, usage: BarUsage, compaction: &CompactionSettings) -> Self {
        if cells == 0 {
            return Self::default();
        }

        let total = usage.total_tokens.max(1);
        let cached_tokens = usage.cached_tokens.min(total);
        let used_tokens = usage.fresh_tokens.saturating_add(cached_tokens).min(total);
        let fresh_tokens = used_tokens - cached_tokens;

        let reserved = if compaction.enabled && compaction.reserve_tokens > 0 {
            scale(compaction.reserve_tokens.min(total), cells, total).min(cells - 1)
        } else {
            0
        };

        let used = scale(used_tokens, cells, total).min(cells - reserved);
        let mut cached = scale(cached_tokens, cells, total).min(used);
        if fresh_tokens > 0 && cached == used && used > 1 {
            cached -= 1;
        }

        Self {
            cached,
            fresh: used - cached,
            free: cells - reserved - used,
            reserved,
        }
    }

    pub fn used(&self) -> usize {
        self.cached + self.fresh
    }

    pub fn cells(&self) -> usize {
        self.used() + self.free + self.reserved
    }
}

#[derive(Clone, Copy)]
enum Zone {
    Cached,
    Fresh,
    Free,
    Reserved,
}

fn cell_style(zone: Zone, index: usize, warn_at: usize, alert_at: usize) -> (&'static str, char) {
    let band = if index < warn_at {
        0
    } else if index < alert_at {
        1
    } else {
        2
    };
    let (bright, dim) = [(GREEN, DIM_GREEN), (YELLOW, DIM_YELLOW), (RED, DIM_RED)][band];
    match zone {
        Zone::Cached => (dim, USED_GLYPH),
        Zone::Fresh => (bright, USED_GLYPH),
        Zone::Free => (dim, FREE_GLYPH),
        Zone::Reserved => (DIM_WHITE, RESERVED_GLYPH),
    }
}

/// Render an allocation as colored glyphs. An empty allocation renders as "".
pub fn render(alloc: &BarAllocation) -> String {
    let cells = alloc.cells();
    if cells == 0 {
        return String::new();
    }

    let warn_at = cells * 60 / 100;
    let alert_at = cells * 85 / 100;
    let zones = std::iter::repeat_n(Zone::Cached, alloc.cached)
        .chain(std::iter::repeat_n(Zone::Fresh, alloc.fresh))
        .chain(std::iter::repeat_n(Zone::Free, alloc.free))
        .chain(std::iter::repeat_n(Zone::Reserved, alloc.reserved));

    let mut out = String::with_capacity(cells * 12);
    let mut current: Option<&str> = None;
    for (index, zone) in zones.enumerate() {
        let (color, glyph) = cell_style(zone, index, warn_at, alert_at);
        if current != Some(color) {
            if current.is_some() {
                out.push_str(RESET);
            }
            out.push_str(color);
            current = Some(color);
        }
        out.push(glyph);
    }
    out.push_str(RESET);
    out
}

/// Allocate and render in one step.
pub fn build_bar(cells: usize, usage: BarUsage, compaction: &CompactionSettings) -> String {
    render(&BarAllocation::compute(cells, usage, compaction))
}
