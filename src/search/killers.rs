use crate::evaluation::Score;
use crate::position::Move;

/// Two moves per remaining depth that recently caused a beta cutoff, with the scores they got
#[derive(Clone, Debug, Default)]
pub struct Killers {
    slots: Vec<[Option<(Move, Score)>; 2]>,
}

impl Killers {
    pub fn new(max_depth: u16) -> Self {
        Killers {
            slots: vec![[None; 2]; max_depth as usize + 1],
        }
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = [None; 2]);
    }

    pub fn moves(&self, depth: u16) -> impl Iterator<Item = Move> + '_ {
        self.slots
            .get(depth as usize)
            .into_iter()
            .flatten()
            .flatten()
            .map(|(mv, _)| *mv)
    }

    /// Remembers a cutoff move. Empty slots are filled first, then the lower-scoring killer is replaced.
    pub fn record(&mut self, depth: u16, mv: Move, score: Score) {
        let Some(slot) = self.slots.get_mut(depth as usize) else {
            return;
        };
        if slot.iter().flatten().any(|(killer, _)| *killer == mv) {
            return;
        }
        let index = match *slot {
            [None, _] => 0,
            [_, None] => 1,
            [Some((_, score0)), Some((_, score1))] => (score1 < score0) as usize,
        };
        slot[index] = Some((mv, score));
    }
}
