//! Course generation, terrain model and structural validation.
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::constants::{
    CHUNK_MAX, CHUNK_MIN, COBBLE_SECTOR_LEN_MAX, COBBLE_SECTOR_LEN_MIN, COBBLE_SECTOR_MAX,
    COBBLE_SECTOR_MIN, COST_DESCENT, COST_FLAT, COST_HILL, COST_MOUNTAIN, COST_SPRINT,
    MIN_CLIMB_LENGTH, MIN_HILL_LENGTH, REFUEL_ZONE_ANCHORS, REFUEL_ZONE_MAX, REFUEL_ZONE_MIN,
};
use crate::numbers::{round_f64_to_i32, usize_to_f64, usize_to_u32};

/// Terrain tag carried by every course cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Terrain {
    #[default]
    Flat,
    Hill,
    Mountain,
    Descent,
    Sprint,
}

impl Terrain {
    pub const ALL: [Self; 5] = [
        Self::Flat,
        Self::Hill,
        Self::Mountain,
        Self::Descent,
        Self::Sprint,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Flat => "flat",
            Self::Hill => "hill",
            Self::Mountain => "mountain",
            Self::Descent => "descent",
            Self::Sprint => "sprint",
        }
    }

    /// Energy spent per cell before archetype adaptation.
    #[must_use]
    pub const fn base_energy_cost(self) -> f64 {
        match self {
            Self::Flat => COST_FLAT,
            Self::Hill => COST_HILL,
            Self::Mountain => COST_MOUNTAIN,
            Self::Descent => COST_DESCENT,
            Self::Sprint => COST_SPRINT,
        }
    }

    /// Drafting only works away from climbs and descents.
    #[must_use]
    pub const fn allows_aspiration(self) -> bool {
        !matches!(self, Self::Mountain | Self::Descent)
    }

    /// Riders on these terrains never take wind.
    #[must_use]
    pub const fn always_sheltered(self) -> bool {
        matches!(self, Self::Mountain | Self::Descent)
    }
}

impl fmt::Display for Terrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Cell {
    pub terrain: Terrain,
    #[serde(default)]
    pub is_refuel_zone: bool,
    #[serde(default)]
    pub is_cobblestone: bool,
}

impl Cell {
    #[must_use]
    pub const fn new(terrain: Terrain) -> Self {
        Self {
            terrain,
            is_refuel_zone: false,
            is_cobblestone: false,
        }
    }
}

/// Immutable ordered cell sequence. Position 0 is the virtual start line,
/// position `p >= 1` maps to `cells[p - 1]` and the finish line is `cells.len()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Course {
    pub cells: Vec<Cell>,
}

impl Course {
    #[must_use]
    pub const fn new(cells: Vec<Cell>) -> Self {
        Self { cells }
    }

    /// Build a course from bare terrain tags.
    #[must_use]
    pub fn from_terrain(terrain: &[Terrain]) -> Self {
        Self::new(terrain.iter().copied().map(Cell::new).collect())
    }

    /// Position of the finish line.
    #[must_use]
    pub fn finish_line(&self) -> u32 {
        usize_to_u32(self.cells.len())
    }

    #[must_use]
    pub fn cell_at(&self, position: u32) -> Option<&Cell> {
        let index = usize::try_from(position).ok()?.checked_sub(1)?;
        self.cells.get(index)
    }

    /// Terrain under a position; the start line counts as flat and anything past
    /// the finish line reports the final cell's terrain.
    #[must_use]
    pub fn terrain_at(&self, position: u32) -> Terrain {
        if position == 0 {
            return Terrain::Flat;
        }
        self.cell_at(position.min(self.finish_line()))
            .map_or(Terrain::Flat, |cell| cell.terrain)
    }

    #[must_use]
    pub fn is_refuel(&self, position: u32) -> bool {
        self.cell_at(position).is_some_and(|cell| cell.is_refuel_zone)
    }

    #[must_use]
    pub fn is_cobblestone(&self, position: u32) -> bool {
        self.cell_at(position).is_some_and(|cell| cell.is_cobblestone)
    }

    /// Positions of every climb summit (last mountain cell before other terrain).
    #[must_use]
    pub fn summits(&self) -> Vec<u32> {
        (1..=self.finish_line())
            .filter(|&pos| {
                self.terrain_at(pos) == Terrain::Mountain
                    && (pos == self.finish_line() || self.terrain_at(pos + 1) != Terrain::Mountain)
            })
            .collect()
    }

    /// True when a move from `from` to `to` reaches or passes a summit.
    #[must_use]
    pub fn crosses_summit(&self, from: u32, to: u32) -> bool {
        self.summits()
            .into_iter()
            .any(|summit| from < summit && to >= summit)
    }

    /// Cobblestone positions strictly after `from` up to and including `to`.
    #[must_use]
    pub fn cobbles_between(&self, from: u32, to: u32) -> Vec<u32> {
        let end = to.min(self.finish_line());
        (from.saturating_add(1)..=end)
            .filter(|&pos| self.is_cobblestone(pos))
            .collect()
    }

    /// Cells left before the finish line.
    #[must_use]
    pub fn remaining(&self, position: u32) -> u32 {
        self.finish_line().saturating_sub(position)
    }
}

/// Terrain percentages used to size a generated course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainDistribution {
    pub flat: u8,
    pub hill: u8,
    pub mountain: u8,
    pub descent: u8,
    pub sprint: u8,
}

impl TerrainDistribution {
    #[must_use]
    pub const fn share(&self, terrain: Terrain) -> u8 {
        match terrain {
            Terrain::Flat => self.flat,
            Terrain::Hill => self.hill,
            Terrain::Mountain => self.mountain,
            Terrain::Descent => self.descent,
            Terrain::Sprint => self.sprint,
        }
    }

    fn total(&self) -> u32 {
        Terrain::ALL
            .iter()
            .map(|terrain| u32::from(self.share(*terrain)))
            .sum()
    }

    /// Convert percentages to whole cell counts summing exactly to `cells`.
    #[must_use]
    pub fn to_counts(&self, cells: usize) -> [(Terrain, usize); 5] {
        let total = self.total().max(1);
        let mut counts = Terrain::ALL.map(|terrain| {
            let share = usize::try_from(u32::from(self.share(terrain))).unwrap_or(0);
            let total = usize::try_from(total).unwrap_or(1);
            (terrain, cells * share / total)
        });
        let assigned: usize = counts.iter().map(|(_, count)| count).sum();
        counts[0].1 += cells.saturating_sub(assigned);
        counts
    }
}

/// Named course presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PresetId {
    Flat,
    Hilly,
    Mountain,
    #[default]
    Balanced,
    Cobbles,
}

impl PresetId {
    pub const ALL: [Self; 5] = [
        Self::Flat,
        Self::Hilly,
        Self::Mountain,
        Self::Balanced,
        Self::Cobbles,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Flat => "flat",
            Self::Hilly => "hilly",
            Self::Mountain => "mountain",
            Self::Balanced => "balanced",
            Self::Cobbles => "cobbles",
        }
    }

    /// Two-letter prefix used by race codes.
    #[must_use]
    pub const fn code_prefix(self) -> &'static str {
        match self {
            Self::Flat => "FL",
            Self::Hilly => "HL",
            Self::Mountain => "MT",
            Self::Balanced => "BL",
            Self::Cobbles => "CB",
        }
    }

    #[must_use]
    pub fn from_code_prefix(prefix: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|preset| preset.code_prefix().eq_ignore_ascii_case(prefix))
    }

    #[must_use]
    pub fn preset(self) -> CoursePreset {
        CoursePreset::for_id(self)
    }
}

impl fmt::Display for PresetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PresetId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|preset| preset.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or(())
    }
}

/// Structural hints driving course generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoursePreset {
    pub id: PresetId,
    pub distribution: TerrainDistribution,
    #[serde(default = "CoursePreset::default_min_climb")]
    pub min_climb_length: usize,
    #[serde(default = "CoursePreset::default_min_hill")]
    pub min_hill_length: usize,
    #[serde(default)]
    pub start_flat_length: usize,
    #[serde(default)]
    pub end_sprint_length: usize,
    #[serde(default)]
    pub pattern: Option<Vec<Terrain>>,
    #[serde(default)]
    pub sprint_finish_probability: Option<f64>,
    #[serde(default)]
    pub cobblestones: bool,
}

impl CoursePreset {
    const fn default_min_climb() -> usize {
        MIN_CLIMB_LENGTH
    }

    const fn default_min_hill() -> usize {
        MIN_HILL_LENGTH
    }

    #[must_use]
    pub fn for_id(id: PresetId) -> Self {
        let base = Self {
            id,
            distribution: TerrainDistribution {
                flat: 45,
                hill: 20,
                mountain: 15,
                descent: 10,
                sprint: 10,
            },
            min_climb_length: MIN_CLIMB_LENGTH,
            min_hill_length: MIN_HILL_LENGTH,
            start_flat_length: 5,
            end_sprint_length: 4,
            pattern: None,
            sprint_finish_probability: None,
            cobblestones: false,
        };
        match id {
            PresetId::Balanced => base,
            PresetId::Flat => Self {
                distribution: TerrainDistribution {
                    flat: 75,
                    hill: 10,
                    mountain: 0,
                    descent: 5,
                    sprint: 10,
                },
                end_sprint_length: 5,
                ..base
            },
            PresetId::Hilly => Self {
                distribution: TerrainDistribution {
                    flat: 45,
                    hill: 40,
                    mountain: 0,
                    descent: 10,
                    sprint: 5,
                },
                start_flat_length: 4,
                end_sprint_length: 3,
                sprint_finish_probability: Some(0.5),
                ..base
            },
            PresetId::Mountain => Self {
                distribution: TerrainDistribution {
                    flat: 30,
                    hill: 15,
                    mountain: 35,
                    descent: 20,
                    sprint: 0,
                },
                start_flat_length: 4,
                end_sprint_length: 3,
                pattern: Some(vec![
                    Terrain::Flat,
                    Terrain::Hill,
                    Terrain::Mountain,
                    Terrain::Descent,
                    Terrain::Flat,
                    Terrain::Mountain,
                ]),
                sprint_finish_probability: Some(0.2),
                ..base
            },
            PresetId::Cobbles => Self {
                distribution: TerrainDistribution {
                    flat: 65,
                    hill: 25,
                    mountain: 0,
                    descent: 0,
                    sprint: 10,
                },
                end_sprint_length: 5,
                cobblestones: true,
                ..base
            },
        }
    }
}

/// Structural constraint violations reported by [`validate_course`].
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum CourseViolation {
    #[error("course has no cells")]
    Empty,
    #[error("climb at position {start} runs {length} cells (minimum {min})")]
    ClimbTooShort { start: u32, length: usize, min: usize },
    #[error("hill at position {start} runs {length} cells (minimum {min})")]
    HillTooShort { start: u32, length: usize, min: usize },
    #[error("expected {expected} refuel zones, found {found}")]
    RefuelZoneCount { expected: usize, found: usize },
    #[error("refuel zone at position {start} spans {length} cells")]
    RefuelZoneLength { start: u32, length: usize },
    #[error("cobblestone course must end with a sprint")]
    MissingSprintFinish,
    #[error("expected {min}-{max} cobblestone sectors, found {found}")]
    CobbleSectorCount { min: usize, max: usize, found: usize },
    #[error("cobblestone on {terrain} at position {position}")]
    CobbleOnInvalidTerrain { position: u32, terrain: Terrain },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Segment {
    terrain: Terrain,
    len: usize,
}

/// Generate a course of `length` cells from a preset. Never fails.
pub fn generate_course<R: Rng + ?Sized>(length: u32, preset: &CoursePreset, rng: &mut R) -> Course {
    let length = usize::try_from(length).unwrap_or(0).max(1);
    let sprint_finish = preset.cobblestones
        || (preset.end_sprint_length > 0
            && preset
                .sprint_finish_probability
                .is_none_or(|chance| rng.r#gen::<f64>() < chance));
    let end_len = if sprint_finish {
        preset
            .end_sprint_length
            .max(usize::from(preset.cobblestones) * 3)
            .min(length / 4)
    } else {
        0
    };
    let start_len = preset.start_flat_length.min(length / 4);
    let body_len = length.saturating_sub(start_len + end_len);

    let counts = preset.distribution.to_counts(body_len);
    let mut segments = build_segments(&counts, preset, rng);
    normalize_segments(&mut segments, preset.min_climb_length, preset.min_hill_length);

    let mut cells = Vec::with_capacity(length);
    cells.extend(std::iter::repeat_n(Cell::new(Terrain::Flat), start_len));
    for segment in &segments {
        cells.extend(std::iter::repeat_n(Cell::new(segment.terrain), segment.len));
    }
    cells.extend(std::iter::repeat_n(Cell::new(Terrain::Sprint), end_len));
    cells.resize(length, Cell::new(Terrain::Flat));

    place_refuel_zones(&mut cells, rng);
    if preset.cobblestones {
        overlay_cobblestones(&mut cells, start_len, length - end_len, rng);
    }
    Course::new(cells)
}

fn chunk_bounds(terrain: Terrain, preset: &CoursePreset) -> (usize, usize) {
    match terrain {
        Terrain::Mountain => (preset.min_climb_length, preset.min_climb_length + 10),
        Terrain::Hill => (preset.min_hill_length, preset.min_hill_length + 6),
        _ => (CHUNK_MIN, CHUNK_MAX),
    }
}

fn split_into_chunks<R: Rng + ?Sized>(count: usize, lo: usize, hi: usize, rng: &mut R) -> Vec<usize> {
    let lo = lo.max(1);
    let hi = hi.max(lo);
    let mut chunks = Vec::new();
    let mut remaining = count;
    while remaining > 0 {
        let mut size = rng.gen_range(lo..=hi).min(remaining);
        let leftover = remaining - size;
        if leftover > 0 && leftover < lo {
            size = remaining;
        }
        chunks.push(size);
        remaining -= size;
    }
    chunks
}

fn build_segments<R: Rng + ?Sized>(
    counts: &[(Terrain, usize); 5],
    preset: &CoursePreset,
    rng: &mut R,
) -> Vec<Segment> {
    if let Some(pattern) = preset.pattern.as_ref().filter(|p| !p.is_empty()) {
        return segments_from_pattern(counts, pattern, preset);
    }

    let mut descents: Vec<Segment> = Vec::new();
    let mut others: Vec<Segment> = Vec::new();
    for &(terrain, count) in counts {
        let (lo, hi) = chunk_bounds(terrain, preset);
        for len in split_into_chunks(count, lo, hi, rng) {
            let segment = Segment { terrain, len };
            if terrain == Terrain::Descent {
                descents.push(segment);
            } else {
                others.push(segment);
            }
        }
    }
    others.shuffle(rng);

    let mut segments = Vec::with_capacity(others.len() + descents.len());
    for segment in others {
        segments.push(segment);
        if segment.terrain == Terrain::Mountain
            && let Some(descent) = descents.pop()
        {
            segments.push(descent);
        }
    }
    for descent in descents {
        let slot = rng.gen_range(0..=segments.len());
        segments.insert(slot, descent);
    }
    segments
}

fn segments_from_pattern(
    counts: &[(Terrain, usize); 5],
    pattern: &[Terrain],
    preset: &CoursePreset,
) -> Vec<Segment> {
    let mut segments = Vec::with_capacity(pattern.len() + 1);
    let mut leftover = 0;
    // Fewer, longer segments when the budget cannot fill every slot to its minimum.
    let slots = counts.map(|(terrain, count)| {
        let occurrences = pattern.iter().filter(|t| **t == terrain).count();
        if occurrences == 0 {
            leftover += count;
            return 0;
        }
        let (lo, _) = chunk_bounds(terrain, preset);
        occurrences.min((count / lo.max(1)).max(1))
    });
    let mut seen = [0usize; 5];
    let mut used = [0usize; 5];
    for terrain in pattern {
        let Some(index) = Terrain::ALL.iter().position(|t| t == terrain) else {
            continue;
        };
        let count = counts[index].1;
        let slot = seen[index];
        seen[index] += 1;
        let len = if slot >= slots[index] {
            0
        } else if slot + 1 == slots[index] {
            count - used[index]
        } else {
            count / slots[index]
        };
        used[index] += len;
        if len > 0 {
            segments.push(Segment {
                terrain: *terrain,
                len,
            });
        }
    }
    if leftover > 0 {
        segments.push(Segment {
            terrain: Terrain::Flat,
            len: leftover,
        });
    }
    segments
}

fn merge_adjacent(segments: &mut Vec<Segment>) {
    let mut merged: Vec<Segment> = Vec::with_capacity(segments.len());
    for segment in segments.drain(..) {
        match merged.last_mut() {
            Some(last) if last.terrain == segment.terrain => last.len += segment.len,
            _ => merged.push(segment),
        }
    }
    *segments = merged;
}

fn normalize_segments(segments: &mut Vec<Segment>, min_climb: usize, min_hill: usize) {
    merge_adjacent(segments);
    for segment in segments.iter_mut() {
        if segment.terrain == Terrain::Mountain && segment.len < min_climb {
            segment.terrain = Terrain::Hill;
        }
    }
    merge_adjacent(segments);
    for segment in segments.iter_mut() {
        if segment.terrain == Terrain::Hill && segment.len < min_hill {
            segment.terrain = Terrain::Flat;
        }
    }
    merge_adjacent(segments);
}

fn place_refuel_zones<R: Rng + ?Sized>(cells: &mut [Cell], rng: &mut R) {
    let length = cells.len();
    for anchor in REFUEL_ZONE_ANCHORS {
        let zone_len = rng.gen_range(REFUEL_ZONE_MIN..=REFUEL_ZONE_MAX).min(length);
        let center = usize::try_from(round_f64_to_i32(usize_to_f64(length) * anchor)).unwrap_or(0);
        let start = center
            .saturating_sub(zone_len / 2)
            .min(length.saturating_sub(zone_len));
        for cell in &mut cells[start..start + zone_len] {
            cell.is_refuel_zone = true;
        }
    }
}

fn cobble_friendly(terrain: Terrain) -> bool {
    matches!(terrain, Terrain::Flat | Terrain::Hill)
}

fn find_run(cells: &[Cell], from: usize, to: usize, len: usize, want: impl Fn(Terrain) -> bool) -> Option<usize> {
    let mut run_start = from;
    let mut run_len = 0;
    for (index, cell) in cells.iter().enumerate().take(to).skip(from) {
        if want(cell.terrain) && !cell.is_cobblestone {
            if run_len == 0 {
                run_start = index;
            }
            run_len += 1;
            if run_len >= len {
                return Some(run_start);
            }
        } else {
            run_len = 0;
        }
    }
    None
}

fn overlay_cobblestones<R: Rng + ?Sized>(cells: &mut [Cell], from: usize, to: usize, rng: &mut R) {
    let sectors = rng.gen_range(COBBLE_SECTOR_MIN..=COBBLE_SECTOR_MAX);
    let span = to.saturating_sub(from);
    if span == 0 {
        return;
    }
    let window = span / sectors;
    let mut placed = 0;
    for sector in 0..sectors {
        let sector_len = rng.gen_range(COBBLE_SECTOR_LEN_MIN..=COBBLE_SECTOR_LEN_MAX);
        let prefer = if sector % 2 == 0 {
            Terrain::Hill
        } else {
            Terrain::Flat
        };
        let win_start = from + sector * window;
        let win_end = if sector + 1 == sectors {
            to
        } else {
            (win_start + window).min(to)
        };
        // Keep one uncobbled cell between sectors so they stay distinct.
        let search_start = if sector == 0 { win_start } else { win_start + 1 };
        let start = find_run(cells, search_start, win_end, sector_len, |t| t == prefer)
            .or_else(|| find_run(cells, search_start, win_end, sector_len, cobble_friendly))
            .map(|start| (start, sector_len))
            .or_else(|| {
                find_run(cells, search_start, win_end, COBBLE_SECTOR_LEN_MIN, cobble_friendly)
                    .map(|start| (start, COBBLE_SECTOR_LEN_MIN))
            });
        if let Some((start, len)) = start {
            for cell in &mut cells[start..start + len] {
                cell.is_cobblestone = true;
            }
            placed += 1;
        }
    }
    if placed < sectors {
        log::debug!("placed {placed} of {sectors} cobblestone sectors");
    }
}

fn runs(cells: &[Cell], matches: impl Fn(&Cell) -> bool) -> Vec<(u32, usize)> {
    let mut found = Vec::new();
    let mut start = None;
    for (index, cell) in cells.iter().enumerate() {
        match (matches(cell), start) {
            (true, None) => start = Some(index),
            (false, Some(begin)) => {
                found.push((usize_to_u32(begin + 1), index - begin));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(begin) = start {
        found.push((usize_to_u32(begin + 1), cells.len() - begin));
    }
    found
}

/// Independently re-scan a generated course for structural violations.
#[must_use]
pub fn validate_course(course: &Course, preset: &CoursePreset) -> Vec<CourseViolation> {
    let mut violations = Vec::new();
    if course.cells.is_empty() {
        violations.push(CourseViolation::Empty);
        return violations;
    }

    for (start, length) in runs(&course.cells, |c| c.terrain == Terrain::Mountain) {
        if length < preset.min_climb_length {
            violations.push(CourseViolation::ClimbTooShort {
                start,
                length,
                min: preset.min_climb_length,
            });
        }
    }
    for (start, length) in runs(&course.cells, |c| c.terrain == Terrain::Hill) {
        if length < preset.min_hill_length {
            violations.push(CourseViolation::HillTooShort {
                start,
                length,
                min: preset.min_hill_length,
            });
        }
    }

    let refuel = runs(&course.cells, |c| c.is_refuel_zone);
    if refuel.len() != REFUEL_ZONE_ANCHORS.len() {
        violations.push(CourseViolation::RefuelZoneCount {
            expected: REFUEL_ZONE_ANCHORS.len(),
            found: refuel.len(),
        });
    }
    for (start, length) in refuel {
        if !(REFUEL_ZONE_MIN..=REFUEL_ZONE_MAX).contains(&length) {
            violations.push(CourseViolation::RefuelZoneLength { start, length });
        }
    }

    if preset.cobblestones {
        if course.cells.last().map(|c| c.terrain) != Some(Terrain::Sprint) {
            violations.push(CourseViolation::MissingSprintFinish);
        }
        let sectors = runs(&course.cells, |c| c.is_cobblestone);
        if !(COBBLE_SECTOR_MIN..=COBBLE_SECTOR_MAX).contains(&sectors.len()) {
            violations.push(CourseViolation::CobbleSectorCount {
                min: COBBLE_SECTOR_MIN,
                max: COBBLE_SECTOR_MAX,
                found: sectors.len(),
            });
        }
        for (index, cell) in course.cells.iter().enumerate() {
            if cell.is_cobblestone && !cobble_friendly(cell.terrain) {
                violations.push(CourseViolation::CobbleOnInvalidTerrain {
                    position: usize_to_u32(index + 1),
                    terrain: cell.terrain,
                });
            }
        }
    }
    violations
}
