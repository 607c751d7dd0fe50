use super::model::Flag;

// ---------------------------------------------------------------------------
// Marker cadence
// ---------------------------------------------------------------------------

/// Boundary markers the cycler emits per repeating test unit.
///
/// This cadence was read off the recorded HPPC sessions; it is not documented
/// by the instrument. Confirm it against more files before changing it.
pub const MARKERS_PER_UNIT: usize = 5;

/// Phase (within a unit) of the marker that opens a pulse discharge.
pub const PULSE_PHASE: usize = 0;

/// Phase (within a unit) of the marker that opens a constant discharge
/// followed by a rest period.
pub const REST_PHASE: usize = 3;

// ---------------------------------------------------------------------------
// Flag occurrence lookup
// ---------------------------------------------------------------------------

/// Positions where the flag channel carries a boundary (`S`) marker, ascending.
///
/// Alternation of start/stop markers is not validated.
pub fn find_boundary_indices(flags: &[Flag]) -> Vec<usize> {
    positions_of(flags, &Flag::Boundary)
}

/// Positions where the flag channel carries a terminal (`Q`) marker, ascending.
pub fn find_terminal_indices(flags: &[Flag]) -> Vec<usize> {
    positions_of(flags, &Flag::Terminal)
}

fn positions_of(flags: &[Flag], wanted: &Flag) -> Vec<usize> {
    flags
        .iter()
        .enumerate()
        .filter(|(_, f)| *f == wanted)
        .map(|(i, _)| i)
        .collect()
}

// ---------------------------------------------------------------------------
// IndexGroup – five parallel index arrays for one kind of electrical phase
// ---------------------------------------------------------------------------

/// Sample indices marking the phases of every repeating test unit.
///
/// For pulse groups:
/// * `id0` – start of pulse discharge
/// * `id1` – sample after the pulse starts
/// * `id2` – end of pulse discharge
/// * `id3` – sample after the pulse ends
/// * `id4` – end of the rest following the pulse
///
/// Rest groups use the same slots for the constant discharge and its rest.
///
/// The arrays are not guaranteed to have equal length: a trailing partial
/// unit leaves them ragged, and callers must tolerate that.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexGroup {
    pub id0: Vec<usize>,
    pub id1: Vec<usize>,
    pub id2: Vec<usize>,
    pub id3: Vec<usize>,
    pub id4: Vec<usize>,
}

impl IndexGroup {
    /// The five arrays in slot order.
    pub fn slots(&self) -> [&[usize]; 5] {
        [
            self.id0.as_slice(),
            self.id1.as_slice(),
            self.id2.as_slice(),
            self.id3.as_slice(),
            self.id4.as_slice(),
        ]
    }

    /// Length of each slot.
    pub fn lens(&self) -> [usize; 5] {
        self.slots().map(<[usize]>::len)
    }

    /// Number of units for which every slot has an entry.
    pub fn complete_units(&self) -> usize {
        self.lens().into_iter().min().unwrap_or(0)
    }

    pub fn is_ragged(&self) -> bool {
        let lens = self.lens();
        lens.iter().any(|&l| l != lens[0])
    }
}

/// Every `MARKERS_PER_UNIT`-th boundary position, starting at `phase`.
fn every_unit(positions: &[usize], phase: usize) -> Vec<usize> {
    positions
        .iter()
        .skip(phase)
        .step_by(MARKERS_PER_UNIT)
        .copied()
        .collect()
}

/// The sample right after each index (not another marker lookup).
fn next_sample(ids: &[usize]) -> Vec<usize> {
    ids.iter().map(|&i| i + 1).collect()
}

/// Pulse-discharge indices: phases 0, 1 and 2 of each unit.
pub fn derive_pulse_indices(positions: &[usize]) -> IndexGroup {
    let id0 = every_unit(positions, PULSE_PHASE);
    let id2 = every_unit(positions, PULSE_PHASE + 1);
    IndexGroup {
        id1: next_sample(&id0),
        id0,
        id3: next_sample(&id2),
        id2,
        id4: every_unit(positions, PULSE_PHASE + 2),
    }
}

/// Constant-discharge and rest indices: phases 3, 4 and 5 of each unit.
///
/// The last phase-3 marker is dropped so `id0` lines up with the rest end
/// taken from the next unit.
pub fn derive_rest_indices(positions: &[usize]) -> IndexGroup {
    let mut id0 = every_unit(positions, REST_PHASE);
    id0.pop();
    let id2 = every_unit(positions, REST_PHASE + 1);
    IndexGroup {
        id1: next_sample(&id0),
        id0,
        id3: next_sample(&id2),
        id2,
        id4: every_unit(positions, REST_PHASE + 2),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags_with_boundaries(n: usize, at: &[usize]) -> Vec<Flag> {
        (0..n)
            .map(|i| {
                if at.contains(&i) {
                    Flag::Boundary
                } else {
                    Flag::Blank
                }
            })
            .collect()
    }

    #[test]
    fn boundary_lookup_reports_exactly_the_marked_rows() {
        let marked = [0, 3, 4, 17, 29];
        let mut flags = flags_with_boundaries(30, &marked);
        flags[5] = Flag::Terminal;
        flags[6] = Flag::Other("X".into());
        assert_eq!(find_boundary_indices(&flags), marked.to_vec());
        assert_eq!(find_terminal_indices(&flags), vec![5]);
    }

    #[test]
    fn lookup_on_blank_channel_is_empty() {
        let flags = vec![Flag::Blank; 8];
        assert!(find_boundary_indices(&flags).is_empty());
        assert!(find_terminal_indices(&flags).is_empty());
        assert!(find_boundary_indices(&[]).is_empty());
    }

    #[test]
    fn pulse_groups_follow_stride_five() {
        let positions: Vec<usize> = (0..10).map(|i| 10 * (i + 1)).collect();
        let g = derive_pulse_indices(&positions);
        assert_eq!(g.id0, vec![10, 60]);
        assert_eq!(g.id1, vec![11, 61]);
        assert_eq!(g.id2, vec![20, 70]);
        assert_eq!(g.id3, vec![21, 71]);
        assert_eq!(g.id4, vec![30, 80]);
        assert!(!g.is_ragged());
        assert_eq!(g.complete_units(), 2);
    }

    #[test]
    fn pulse_groups_are_equal_length_for_whole_units() {
        for units in 0..6 {
            let positions: Vec<usize> = (0..units * MARKERS_PER_UNIT).map(|i| i * 7 + 2).collect();
            let g = derive_pulse_indices(&positions);
            assert_eq!(g.lens(), [units; 5]);
        }
    }

    #[test]
    fn pulse_groups_tolerate_partial_unit() {
        let positions = [1, 2, 3, 4, 5, 6, 7];
        let g = derive_pulse_indices(&positions);
        assert_eq!(g.lens(), [2, 2, 2, 2, 1]);
        assert!(g.is_ragged());
        assert_eq!(g.complete_units(), 1);
    }

    #[test]
    fn rest_groups_are_phase_shifted_by_three() {
        let positions: Vec<usize> = (0..11).map(|i| 100 + i).collect();
        let g = derive_rest_indices(&positions);
        // phase 3 → [103, 108], last one dropped
        assert_eq!(g.id0, vec![103]);
        assert_eq!(g.id1, vec![104]);
        assert_eq!(g.id2, vec![104, 109]);
        assert_eq!(g.id3, vec![105, 110]);
        assert_eq!(g.id4, vec![105, 110]);
    }

    #[test]
    fn rest_groups_on_short_input_are_empty() {
        let g = derive_rest_indices(&[1, 2, 3]);
        assert_eq!(g, IndexGroup::default());
        assert_eq!(g.complete_units(), 0);
    }

    #[test]
    fn derivations_are_deterministic() {
        let positions = [4, 9, 15, 22, 30, 31, 38, 44, 51, 60, 66];
        assert_eq!(derive_pulse_indices(&positions), derive_pulse_indices(&positions));
        assert_eq!(derive_rest_indices(&positions), derive_rest_indices(&positions));
    }
}
