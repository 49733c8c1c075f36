//! Compact read-only rendition of the word-form automaton. It cannot be
//! built or minimized directly, only loaded from a file produced by the
//! [`AutomatonBuilder`](super::AutomatonBuilder). States are flat records
//! and transitions are label-sorted for binary search.

use std::fs::File;
use std::io::Cursor;
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};
use memmap2::Mmap;

use super::{AutomatonError, AutomatonOutput};
use crate::constants::{ANNOTATION_DELIMITER, MAX_AUTOMAT_OUTPUT_SIZE};
use crate::types::{Label, StateId};

struct CompactState {
    is_final: bool,
    first_transition: u32,
    transition_count: u32,
}

pub struct CompactAutomaton {
    states: Vec<CompactState>,
    transitions: Vec<(Label, StateId)>,
}

impl CompactAutomaton {
    pub fn from_file(path: &Path) -> Result<CompactAutomaton, AutomatonError> {
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };
        CompactAutomaton::from_bytes(&mmap)
    }

    pub fn from_bytes(data: &[u8]) -> Result<CompactAutomaton, AutomatonError> {
        let mut reader = Cursor::new(data);
        let state_count = reader.read_u32::<LittleEndian>()? as usize;
        if state_count == 0 {
            return Err(AutomatonError::Malformed("no states".into()));
        }
        let mut records: Vec<Option<(bool, Vec<(Label, StateId)>)>> =
            std::iter::repeat_with(|| None).take(state_count).collect();
        for _ in 0..state_count {
            let record_len = reader.read_u64::<LittleEndian>()?;
            let id = reader.read_u32::<LittleEndian>()? as usize;
            let is_final = reader.read_u8()? != 0;
            let transition_count = reader.read_u32::<LittleEndian>()? as usize;
            if record_len != (4 + 1 + 4 + 8 * transition_count) as u64 {
                return Err(AutomatonError::Malformed(format!(
                    "state record length {} does not match {} transitions",
                    record_len, transition_count
                )));
            }
            if id >= state_count {
                return Err(AutomatonError::Malformed(format!("state id {} out of range", id)));
            }
            let mut transitions = Vec::with_capacity(transition_count);
            for _ in 0..transition_count {
                let label = reader.read_u32::<LittleEndian>()?;
                let target = reader.read_u32::<LittleEndian>()?;
                let label = char::from_u32(label).ok_or_else(|| {
                    AutomatonError::Malformed(format!("invalid transition label {:#x}", label))
                })?;
                if target as usize >= state_count {
                    return Err(AutomatonError::Malformed(format!(
                        "transition target {} out of range",
                        target
                    )));
                }
                transitions.push((label, target));
            }
            transitions.sort_unstable_by_key(|&(label, _)| label);
            if records[id].replace((is_final, transitions)).is_some() {
                return Err(AutomatonError::Malformed(format!("duplicate state id {}", id)));
            }
        }

        let mut states = Vec::with_capacity(state_count);
        let mut transitions = Vec::new();
        for record in records {
            // every id seen exactly once, so all slots are filled
            let (is_final, state_transitions) = match record {
                Some(record) => record,
                None => return Err(AutomatonError::Malformed("missing state record".into())),
            };
            states.push(CompactState {
                is_final,
                first_transition: transitions.len() as u32,
                transition_count: state_transitions.len() as u32,
            });
            transitions.extend(state_transitions);
        }
        Ok(CompactAutomaton { states, transitions })
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    #[inline(always)]
    pub fn is_final(&self, state: StateId) -> bool {
        self.states[state as usize].is_final
    }

    #[inline(always)]
    fn state_transitions(&self, state: StateId) -> &[(Label, StateId)] {
        let state = &self.states[state as usize];
        let start = state.first_transition as usize;
        &self.transitions[start..start + state.transition_count as usize]
    }

    #[inline(always)]
    fn transition(&self, state: StateId, label: Label) -> Option<StateId> {
        let transitions = self.state_transitions(state);
        transitions
            .binary_search_by_key(&label, |&(l, _)| l)
            .ok()
            .map(|index| transitions[index].1)
    }

    /// Longest prefix of `word` the automaton can walk from the initial
    /// state, and the state the walk ends in.
    pub fn common_prefix(&self, word: &[Label]) -> (usize, StateId) {
        let mut state: StateId = 0;
        for (i, &label) in word.iter().enumerate() {
            match self.transition(state, label) {
                Some(target) => state = target,
                None => return (i, state),
            }
        }
        (word.len(), state)
    }

    /// How much of the (reversed) word the automaton recognizes without
    /// prediction. Equals the word length for known word forms; used to
    /// rank languages for an unknown word.
    pub fn recognized_prefix_len(&self, word: &[Label]) -> usize {
        self.common_prefix(word).0
    }

    /// All outputs reachable for `word` (a reversed word form). A full walk
    /// ending at an annotation gives exact outputs; otherwise, when at least
    /// `min_prediction_prefix` characters matched, every continuation is
    /// collected as a prediction.
    pub fn outputs(&self, word: &[Label], min_prediction_prefix: usize) -> Vec<AutomatonOutput> {
        let (prefix_len, last_state) = self.common_prefix(word);
        let mut outputs = Vec::new();
        let mut buffer = String::new();
        if prefix_len == word.len() && self.transition(last_state, ANNOTATION_DELIMITER).is_some() {
            self.collect_outputs(last_state, false, prefix_len, 0, &mut buffer, &mut outputs);
        } else if prefix_len >= min_prediction_prefix {
            self.collect_outputs(last_state, true, prefix_len, 0, &mut buffer, &mut outputs);
        }
        outputs
    }

    fn collect_outputs(
        &self,
        state: StateId,
        is_prediction: bool,
        prefix_len: usize,
        depth: usize,
        buffer: &mut String,
        outputs: &mut Vec<AutomatonOutput>,
    ) {
        if self.is_final(state) {
            outputs.push(AutomatonOutput {
                text: buffer.clone(),
                prefix_len,
                is_prediction,
            });
            if !is_prediction {
                return;
            }
        }
        if depth + 1 >= MAX_AUTOMAT_OUTPUT_SIZE {
            return;
        }
        if depth == 0 && !is_prediction {
            // exact mode walks only the annotation branch
            if let Some(target) = self.transition(state, ANNOTATION_DELIMITER) {
                buffer.push(ANNOTATION_DELIMITER);
                self.collect_outputs(target, is_prediction, prefix_len, depth + 1, buffer, outputs);
                buffer.pop();
            }
        } else {
            for &(label, target) in self.state_transitions(state) {
                buffer.push(label);
                self.collect_outputs(target, is_prediction, prefix_len, depth + 1, buffer, outputs);
                buffer.pop();
            }
        }
    }
}
