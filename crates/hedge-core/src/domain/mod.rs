//! 도메인 타입.

pub mod bet;
pub mod game;
pub mod position;

pub use bet::{BetDirection, TeamContext};
pub use game::{GameRecord, PlayerHistory, SeasonType};
pub use position::{
    stat_display_name, stat_for_action, stat_unit, Position, StatKind, ACTION_TO_STAT,
};
