//! Iterative deepening alpha-beta search, driven by MTD(f).
//!
//! Each depth is searched with a series of null-window negamax calls, narrowing a lower and
//! upper bound on the root value until they meet. Results are cached in a shared
//! transposition table, which also provides the best move at the root, since the null-window
//! calls do not return a principal variation.

use std::sync::Arc;
use std::time::{Duration, Instant};

use board_game_traits::Color;
use log::{debug, info};

use crate::evaluation::{Evaluator, Score};
use crate::position::{Board, GameStatus, Move, Winner};

pub mod killers;
pub mod tt;

pub use killers::Killers;
pub use tt::{EntryKind, TranspositionTable, TtEntry};

/// Deepest search the transposition table can record
pub const MAX_SEARCH_DEPTH: u16 = 63;

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SearchSettings {
    max_depth: u16,
    tt_entries: usize,
    time_limit: Option<Duration>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        SearchSettings {
            max_depth: 4,
            tt_entries: 1 << 20,
            time_limit: None,
        }
    }
}

impl SearchSettings {
    pub fn max_depth(mut self, max_depth: u16) -> Self {
        self.max_depth = max_depth.min(MAX_SEARCH_DEPTH);
        self
    }

    /// Size of the transposition table. Each entry takes 16 bytes.
    pub fn tt_entries(mut self, tt_entries: usize) -> Self {
        self.tt_entries = tt_entries.max(1);
        self
    }

    /// Stop deepening once this much time has passed. A depth that has started always finishes.
    pub fn time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit = Some(time_limit);
        self
    }

    pub fn get_max_depth(&self) -> u16 {
        self.max_depth
    }

    pub fn get_tt_entries(&self) -> usize {
        self.tt_entries
    }

    pub fn get_time_limit(&self) -> Option<Duration> {
        self.time_limit
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct SearchStats {
    pub nodes: u64,
    pub leaves: u64,
    pub tt_hits: u64,
    pub passes: u64,
    pub elapsed: Duration,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct SearchResult {
    /// Value of the position for the side to move
    pub score: Score,
    /// `None` if the game is already over
    pub best_move: Option<Move>,
    /// The last depth that was completely searched
    pub depth: u16,
    pub stats: SearchStats,
}

pub struct SearchEngine<E: Evaluator> {
    evaluator: E,
    tt: Arc<TranspositionTable>,
    killers: Killers,
    settings: SearchSettings,
    stats: SearchStats,
}

impl<E: Evaluator> SearchEngine<E> {
    pub fn new(evaluator: E, settings: SearchSettings) -> Self {
        let tt = Arc::new(TranspositionTable::new(settings.tt_entries));
        Self::with_table(evaluator, settings, tt)
    }

    /// Creates an engine that shares its transposition table with others
    pub fn with_table(evaluator: E, settings: SearchSettings, tt: Arc<TranspositionTable>) -> Self {
        SearchEngine {
            evaluator,
            tt,
            killers: Killers::new(settings.max_depth),
            settings,
            stats: SearchStats::default(),
        }
    }

    pub fn table(&self) -> &Arc<TranspositionTable> {
        &self.tt
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// Searches with the configured maximum depth
    pub fn best_move<const S: usize>(&mut self, board: &mut Board<S>) -> SearchResult {
        self.search(board, self.settings.max_depth)
    }

    /// Searches `board` to `max_depth` plies, deepening one ply at a time.
    /// The board is returned to its original state afterwards.
    pub fn search<const S: usize>(&mut self, board: &mut Board<S>, max_depth: u16) -> SearchResult {
        let start_time = Instant::now();
        let max_depth = max_depth.min(MAX_SEARCH_DEPTH);
        self.stats = SearchStats::default();
        self.killers = Killers::new(max_depth);

        let status = board.status();
        if status.over {
            return SearchResult {
                score: terminal_score::<E>(status, board.side_to_move(), 0),
                best_move: None,
                depth: 0,
                stats: self.stats,
            };
        }

        let mut result = SearchResult {
            score: self.evaluator.eval(board, board.side_to_move()),
            best_move: None,
            depth: 0,
            stats: self.stats,
        };

        for depth in 1..=max_depth {
            let (score, best_move) = self.mtdf(board, result.score, depth);
            self.stats.elapsed = start_time.elapsed();
            result = SearchResult {
                score,
                best_move: best_move.or(result.best_move),
                depth,
                stats: self.stats,
            };
            debug!(
                "Depth {}: score {}, best move {}, {} nodes, {} leaves, {} tt hits, {} passes, {:.3}s",
                depth,
                score,
                result
                    .best_move
                    .map(|mv| mv.to_string::<S>())
                    .unwrap_or_else(|| "none".to_string()),
                self.stats.nodes,
                self.stats.leaves,
                self.stats.tt_hits,
                self.stats.passes,
                self.stats.elapsed.as_secs_f32(),
            );

            if score >= E::WIN || score <= E::LOSS {
                debug!("Proven result at depth {}, stopping", depth);
                break;
            }
            if self
                .settings
                .time_limit
                .is_some_and(|time_limit| start_time.elapsed() >= time_limit)
            {
                debug!("Time limit reached after depth {}", depth);
                break;
            }
        }

        if result.best_move.is_none() {
            result.best_move = board.legal_moves().next();
        }
        info!(
            "Searched {} nodes in {:.3}s: {} with score {} at depth {}",
            self.stats.nodes,
            self.stats.elapsed.as_secs_f32(),
            result
                .best_move
                .map(|mv| mv.to_string::<S>())
                .unwrap_or_else(|| "none".to_string()),
            result.score,
            result.depth
        );
        result
    }

    /// Finds the exact value of `board` at `depth` with null-window searches, starting from `guess`
    pub fn mtdf<const S: usize>(
        &mut self,
        board: &mut Board<S>,
        guess: Score,
        depth: u16,
    ) -> (Score, Option<Move>) {
        let root_hash = board.zobrist_hash();
        let mut lower_bound = E::MIN;
        let mut upper_bound = E::MAX;
        let mut g = guess.clamp(E::MIN + 1, E::MAX);
        let mut best_move = None;

        while lower_bound < upper_bound {
            let beta = g.max(lower_bound + 1);
            g = self.negamax(board, depth, beta - 1, beta);
            self.stats.passes += 1;
            if g < beta {
                upper_bound = g;
            } else {
                lower_bound = g;
                // After a fail high, the root's stored move is proven to reach the new lower bound
                if let Some(mv) = self.tt.get(root_hash).and_then(|entry| entry.best_move()) {
                    if board.is_legal(&mv) {
                        best_move = Some(mv);
                    }
                }
            }
        }

        if best_move.is_none() {
            best_move = self
                .tt
                .get(root_hash)
                .and_then(|entry| entry.best_move())
                .filter(|mv| board.is_legal(mv));
        }
        (g, best_move)
    }

    fn negamax<const S: usize>(
        &mut self,
        board: &mut Board<S>,
        depth: u16,
        mut alpha: Score,
        mut beta: Score,
    ) -> Score {
        self.stats.nodes += 1;
        let hash = board.zobrist_hash();

        let tt_entry = self.tt.get(hash);
        if let Some(entry) = tt_entry {
            if entry.depth() >= depth {
                self.stats.tt_hits += 1;
                let score = entry.score();
                match entry.kind() {
                    EntryKind::Exact => return score,
                    EntryKind::LowerBound => alpha = alpha.max(score),
                    EntryKind::UpperBound => beta = beta.min(score),
                    EntryKind::Invalid => (),
                }
                if alpha >= beta {
                    return score;
                }
            }
        }

        let status = board.status();
        if status.over {
            return terminal_score::<E>(status, board.side_to_move(), depth);
        }
        if depth == 0 {
            self.stats.leaves += 1;
            return self.evaluator.eval(board, board.side_to_move());
        }

        let moves = self.ordered_moves(board, depth, tt_entry.and_then(|entry| entry.best_move()));
        let original_alpha = alpha;
        let mut best_score = E::MIN;
        let mut best_move = None;

        for mv in moves {
            let reverse_move = board.execute(mv);
            let score = -self.negamax(board, depth - 1, -beta, -alpha);
            board.undo(reverse_move);

            if score > best_score || best_move.is_none() {
                best_score = score;
                best_move = Some(mv);
            }
            if best_score > alpha {
                alpha = best_score;
            }
            if best_score >= beta {
                // Fail-soft: the returned score may be above beta
                self.killers.record(depth, mv, best_score);
                self.tt
                    .put(hash, TtEntry::new(EntryKind::LowerBound, depth, best_score, Some(mv)));
                return best_score;
            }
        }

        if best_move.is_none() {
            self.stats.leaves += 1;
            return self.evaluator.eval(board, board.side_to_move());
        }

        let kind = if best_score > original_alpha {
            EntryKind::Exact
        } else {
            EntryKind::UpperBound
        };
        self.tt.put(hash, TtEntry::new(kind, depth, best_score, best_move));
        best_score
    }

    /// All legal moves, with the transposition table move first, then killer moves,
    /// then the rest in generation order
    fn ordered_moves<const S: usize>(
        &self,
        board: &Board<S>,
        depth: u16,
        tt_move: Option<Move>,
    ) -> Vec<Move> {
        let mut moves: Vec<Move> = board.legal_moves().collect();
        let mut front = 0;
        for mv in tt_move.into_iter().chain(self.killers.moves(depth)) {
            if let Some(index) = moves[front..].iter().position(|legal| *legal == mv) {
                let mv = moves.remove(front + index);
                moves.insert(front, mv);
                front += 1;
            }
        }
        moves
    }
}

/// Score of a decided game for `side_to_move`. Quicker wins and slower losses score better.
pub(crate) fn terminal_score<E: Evaluator>(
    status: GameStatus,
    side_to_move: Color,
    depth: u16,
) -> Score {
    match status.winner {
        Winner::Tie | Winner::Neither => 0,
        winner if winner == Winner::from(side_to_move) => E::WIN + depth as Score,
        _ => E::LOSS - depth as Score,
    }
}
