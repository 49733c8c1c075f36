//! Incremental construction of a minimal acyclic automaton from a sorted
//! word list, after Daciuk & Watson ("Incremental Construction of Minimal
//! Acyclic Finite-State Automata and Transducers, and Use in the Natural
//! Language Processing").

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};
use hashbrown::HashMap;

use super::AutomatonError;
use crate::types::{Label, StateId};

struct BuildState {
    is_final: bool,
    registered: bool,
    alive: bool,
    transitions: Vec<(Label, StateId)>,
}

impl BuildState {
    fn new() -> BuildState {
        BuildState {
            is_final: false,
            registered: false,
            alive: true,
            transitions: Vec::new(),
        }
    }
}

/// Equivalence-class key: finality plus the label-sorted transition set.
type StateKey = (bool, Vec<(Label, StateId)>);

pub struct AutomatonBuilder {
    states: Vec<BuildState>,
    register: HashMap<StateKey, Vec<StateId>>,
    finished: bool,
}

const INITIAL: StateId = 0;

impl AutomatonBuilder {
    pub fn new() -> AutomatonBuilder {
        AutomatonBuilder {
            states: vec![BuildState::new()],
            register: HashMap::new(),
            finished: false,
        }
    }

    /// Words MUST be added in lexicographic order, and none after
    /// [`finish`](Self::finish) was called.
    pub fn add_word(&mut self, word: &str) {
        debug_assert!(!self.finished);
        let labels: Vec<Label> = word.chars().collect();
        let (prefix_len, last_state) = self.common_prefix(&labels);
        if !self.states[last_state as usize].transitions.is_empty() {
            self.replace_or_register(last_state);
        }
        self.add_suffix(last_state, &labels[prefix_len..]);
    }

    /// Runs the final minimization step. Must be called once, after the last
    /// word.
    pub fn finish(&mut self) {
        if !self.finished {
            if !self.states[INITIAL as usize].transitions.is_empty() {
                self.replace_or_register(INITIAL);
            }
            self.register.clear();
            self.finished = true;
        }
    }

    pub fn state_count(&self) -> usize {
        self.states.iter().filter(|s| s.alive).count()
    }

    fn transition(&self, state: StateId, label: Label) -> Option<StateId> {
        self.states[state as usize]
            .transitions
            .iter()
            .find(|&&(l, _)| l == label)
            .map(|&(_, target)| target)
    }

    fn common_prefix(&self, word: &[Label]) -> (usize, StateId) {
        let mut state = INITIAL;
        for (i, &label) in word.iter().enumerate() {
            match self.transition(state, label) {
                Some(target) => state = target,
                None => return (i, state),
            }
        }
        (word.len(), state)
    }

    fn state_key(&self, state: StateId) -> StateKey {
        let state = &self.states[state as usize];
        let mut transitions = state.transitions.clone();
        transitions.sort_unstable_by_key(|&(label, _)| label);
        (state.is_final, transitions)
    }

    fn unregister(&mut self, state: StateId, old_key: &StateKey) {
        if let Some(class) = self.register.get_mut(old_key) {
            class.retain(|&member| member != state);
            if class.is_empty() {
                self.register.remove(old_key);
            }
        }
        self.states[state as usize].registered = false;
    }

    fn register_state(&mut self, state: StateId) {
        let key = self.state_key(state);
        self.register.entry(key).or_default().push(state);
        self.states[state as usize].registered = true;
    }

    fn add_suffix(&mut self, fork_state: StateId, suffix: &[Label]) {
        // A registered fork must be re-keyed once its transition set grows.
        let old_key = if self.states[fork_state as usize].registered {
            Some(self.state_key(fork_state))
        } else {
            None
        };
        let mut state = fork_state;
        for &label in suffix {
            let new_state = self.states.len() as StateId;
            self.states.push(BuildState::new());
            self.states[state as usize].transitions.push((label, new_state));
            state = new_state;
        }
        self.states[state as usize].is_final = true;
        if let Some(old_key) = old_key {
            self.unregister(fork_state, &old_key);
            self.register_state(fork_state);
        }
    }

    fn replace_or_register(&mut self, state: StateId) {
        let child = match self.states[state as usize].transitions.last() {
            Some(&(_, child)) => child,
            None => return,
        };
        if self.states[child as usize].registered {
            return;
        }
        if !self.states[child as usize].transitions.is_empty() {
            self.replace_or_register(child);
        }
        let key = self.state_key(child);
        let equivalent = self
            .register
            .get(&key)
            .and_then(|class| class.first())
            .copied();
        match equivalent {
            Some(equivalent) if equivalent != child => {
                let old_key = if self.states[state as usize].registered {
                    Some(self.state_key(state))
                } else {
                    None
                };
                self.states[child as usize].alive = false;
                if let Some(last) = self.states[state as usize].transitions.last_mut() {
                    last.1 = equivalent;
                }
                if let Some(old_key) = old_key {
                    self.unregister(state, &old_key);
                    self.register_state(state);
                }
            }
            _ => {
                self.register.entry(key).or_default().push(child);
                self.states[child as usize].registered = true;
            }
        }
    }

    /// Serializes the automaton: `u32` state count, then per state a
    /// `u64` record length, `u32` id, `u8` finality flag, `u32` transition
    /// count and `(u32 label, u32 target)` pairs. Little-endian throughout,
    /// initial state first.
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<(), AutomatonError> {
        debug_assert!(self.finished);
        let mut ids = vec![0u32; self.states.len()];
        let mut order = Vec::with_capacity(self.states.len());
        order.push(INITIAL as usize);
        for (index, state) in self.states.iter().enumerate() {
            if state.alive && index != INITIAL as usize {
                ids[index] = order.len() as u32;
                order.push(index);
            }
        }
        writer.write_u32::<LittleEndian>(order.len() as u32)?;
        for &index in &order {
            let state = &self.states[index];
            let record_len = (4 + 1 + 4 + 8 * state.transitions.len()) as u64;
            writer.write_u64::<LittleEndian>(record_len)?;
            writer.write_u32::<LittleEndian>(ids[index])?;
            writer.write_u8(state.is_final as u8)?;
            writer.write_u32::<LittleEndian>(state.transitions.len() as u32)?;
            for &(label, target) in &state.transitions {
                writer.write_u32::<LittleEndian>(label as u32)?;
                writer.write_u32::<LittleEndian>(ids[target as usize])?;
            }
        }
        Ok(())
    }

    pub fn write_to_file(&self, path: &Path) -> Result<(), AutomatonError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write(&mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

impl Default for AutomatonBuilder {
    fn default() -> Self {
        AutomatonBuilder::new()
    }
}
