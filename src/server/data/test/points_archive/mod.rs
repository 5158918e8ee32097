use super::*;
use crate::server::{data::points_archive::PointsArchiveRepository, model::account::LeaderboardEntry};

mod create;
