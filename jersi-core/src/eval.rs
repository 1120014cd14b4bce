//! Position evaluation

use serde::{Deserialize, Serialize};

use crate::board::{HexIndex, HEX_COUNT};
use crate::game::{GameState, Player, Reward, MAX_CREDIT};

/// Scale separating terminal values from heuristic ones
pub const OMEGA: f32 = 100.0;

/// Number of evaluation features
pub const FEATURE_COUNT: usize = 6;

/// Divisors bringing every feature to roughly [-1, 1]
const NORMALIZATION: [f32; FEATURE_COUNT] = [8.0, 8.0, 4.0, 14.0, 12.0, MAX_CREDIT as f32];

/// Goal distance assumed for a side without fighters
const NO_FIGHTER_DISTANCE: f32 = 8.0;
/// Center distance assumed for a side without cubes
const NO_CUBE_DISTANCE: f32 = 4.0;

/// Feature weights, tuned externally
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    /// Closest fighter to its goals
    pub min_goal_distance: f32,
    /// Average fighter distance to goals
    pub mean_goal_distance: f32,
    /// Average cube distance to the center
    pub mean_center_distance: f32,
    pub cube_count: f32,
    pub fighter_count: f32,
    /// Remaining credit before a draw
    pub credit: f32,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            min_goal_distance: 1.0,
            mean_goal_distance: 0.5,
            mean_center_distance: 0.25,
            cube_count: 0.5,
            fighter_count: 1.0,
            credit: 0.1,
        }
    }
}

impl Weights {
    pub fn from_array(w: [f32; FEATURE_COUNT]) -> Self {
        Self {
            min_goal_distance: w[0],
            mean_goal_distance: w[1],
            mean_center_distance: w[2],
            cube_count: w[3],
            fighter_count: w[4],
            credit: w[5],
        }
    }

    pub fn to_array(&self) -> [f32; FEATURE_COUNT] {
        [
            self.min_goal_distance,
            self.mean_goal_distance,
            self.mean_center_distance,
            self.cube_count,
            self.fighter_count,
            self.credit,
        ]
    }
}

/// Per-side material and distance totals
#[derive(Clone, Copy, Debug, Default)]
struct SideSummary {
    cubes: u32,
    fighters: u32,
    min_goal: Option<u8>,
    goal_sum: u32,
    center_sum: u32,
}

impl SideSummary {
    fn mean_goal(&self) -> f32 {
        if self.fighters == 0 {
            NO_FIGHTER_DISTANCE
        } else {
            self.goal_sum as f32 / self.fighters as f32
        }
    }

    fn min_goal(&self) -> f32 {
        self.min_goal.map_or(NO_FIGHTER_DISTANCE, f32::from)
    }

    fn mean_center(&self) -> f32 {
        if self.cubes == 0 {
            NO_CUBE_DISTANCE
        } else {
            self.center_sum as f32 / self.cubes as f32
        }
    }
}

fn summarize(state: &GameState) -> [SideSummary; 2] {
    let geometry = &state.tables().geometry;
    let mut sides = [SideSummary::default(); 2];
    for hex in 0..HEX_COUNT as HexIndex {
        let code = state.code(hex);
        let owner = match code.owner() {
            Some(owner) => owner,
            None => continue,
        };
        let side = &mut sides[owner.index()];
        let cubes = code.cube_count() as u32;
        let fighters = code.fighter_count() as u32;
        side.cubes += cubes;
        side.center_sum += cubes * geometry.center_distance(hex) as u32;
        if fighters > 0 {
            let goal = geometry.goal_distance(owner, hex);
            side.fighters += fighters;
            side.goal_sum += fighters * goal as u32;
            side.min_goal = Some(side.min_goal.map_or(goal, |d| d.min(goal)));
        }
    }
    sides
}

/// Normalized features from `maximizer`'s point of view
pub fn features(state: &GameState, maximizer: Player) -> [f32; FEATURE_COUNT] {
    let sides = summarize(state);
    let me = &sides[maximizer.index()];
    let opp = &sides[maximizer.opponent().index()];

    let raw = [
        opp.min_goal() - me.min_goal(),
        opp.mean_goal() - me.mean_goal(),
        opp.mean_center() - me.mean_center(),
        me.cubes as f32 - opp.cubes as f32,
        me.fighters as f32 - opp.fighters as f32,
        state.credit() as f32,
    ];

    let mut normalized = [0.0; FEATURE_COUNT];
    for i in 0..FEATURE_COUNT {
        normalized[i] = raw[i] / NORMALIZATION[i];
    }
    normalized
}

/// Weighted evaluator used by the searchers
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StateEvaluator {
    pub weights: Weights,
}

impl StateEvaluator {
    pub fn new(weights: Weights) -> Self {
        Self { weights }
    }

    /// Heuristic value of a non-terminal state
    pub fn evaluate(&self, state: &GameState, maximizer: Player) -> f32 {
        features(state, maximizer)
            .iter()
            .zip(self.weights.to_array())
            .map(|(feature, weight)| feature * weight)
            .sum()
    }

    /// Terminal states score by outcome, scaled by the remaining depth so
    /// faster wins are worth more; anything else falls back to the heuristic
    pub fn evaluate_with_depth(&self, state: &GameState, maximizer: Player, depth: u32) -> f32 {
        match state.reward_for(maximizer) {
            Some(reward) => terminal_value(reward, depth),
            None => self.evaluate(state, maximizer),
        }
    }
}

/// Value of a finished game with `depth` plies left unsearched
pub fn terminal_value(reward: Reward, depth: u32) -> f32 {
    let scale = (depth + 1) as f32;
    match reward {
        Reward::Win => OMEGA * OMEGA * scale,
        Reward::Loss => -OMEGA * OMEGA * scale,
        Reward::Draw => OMEGA * scale,
    }
}
