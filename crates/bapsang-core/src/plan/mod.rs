//! Plan domain: the canonical table types, the generator, and the two
//! post-processing passes.

pub mod balance;
pub mod diversity;
pub mod generate;
pub mod types;

pub use balance::{DailyTargets, DEFAULT_TARGETS, IMBALANCE_TOLERANCE, rebalance_nutrition};
pub use diversity::rebalance_diversity;
pub use generate::{GenerateError, generate_plan};
pub use types::{
    DayMenu, MIXED_GRAIN_RICE, Meal, MealPlan, MealType, PlanLength, Slot, SlotEntry, Weekday,
};
