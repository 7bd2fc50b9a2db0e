//! The canonical plan table: weekdays, meal slots, and the plan structure
//! every core component exchanges.
//!
//! A plan is a thin reference structure -- each cell holds a dish *name*,
//! not a dish record. The slot labels here (`Rice`, `Soup`, `Main`,
//! `Side-1`, `Side-2` and their `Dinner-` mirrors) are the fixed column
//! names of the table crossing the core boundary, including its JSON form.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use bapsang_db::models::Category;

/// The one dish every rice slot holds. Exempt from diversity and
/// substitution logic.
pub const MIXED_GRAIN_RICE: &str = "mixed-grain rice";

// ---------------------------------------------------------------------------
// Weekday
// ---------------------------------------------------------------------------

/// Day label for a plan row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Weekday {
    /// The full week, in plan-row order.
    pub const ALL: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Mon => "Mon",
            Self::Tue => "Tue",
            Self::Wed => "Wed",
            Self::Thu => "Thu",
            Self::Fri => "Fri",
            Self::Sat => "Sat",
            Self::Sun => "Sun",
        };
        f.write_str(s)
    }
}

impl FromStr for Weekday {
    type Err = WeekdayParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Mon" => Ok(Self::Mon),
            "Tue" => Ok(Self::Tue),
            "Wed" => Ok(Self::Wed),
            "Thu" => Ok(Self::Thu),
            "Fri" => Ok(Self::Fri),
            "Sat" => Ok(Self::Sat),
            "Sun" => Ok(Self::Sun),
            other => Err(WeekdayParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`Weekday`] string.
#[derive(Debug, Clone)]
pub struct WeekdayParseError(pub String);

impl fmt::Display for WeekdayParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid weekday: {:?}", self.0)
    }
}

impl std::error::Error for WeekdayParseError {}

// ---------------------------------------------------------------------------
// Meal type and plan length
// ---------------------------------------------------------------------------

/// Which meals the plan covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealType {
    LunchOnly,
    LunchAndDinner,
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::LunchOnly => "lunch_only",
            Self::LunchAndDinner => "lunch_and_dinner",
        };
        f.write_str(s)
    }
}

impl FromStr for MealType {
    type Err = MealTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lunch_only" => Ok(Self::LunchOnly),
            "lunch_and_dinner" => Ok(Self::LunchAndDinner),
            other => Err(MealTypeParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`MealType`] string.
#[derive(Debug, Clone)]
pub struct MealTypeParseError(pub String);

impl fmt::Display for MealTypeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid meal type: {:?}", self.0)
    }
}

impl std::error::Error for MealTypeParseError {}

/// How many days the plan covers: a work week or a full week.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanLength {
    FiveDay,
    SevenDay,
}

impl PlanLength {
    pub fn day_count(self) -> usize {
        match self {
            Self::FiveDay => 5,
            Self::SevenDay => 7,
        }
    }

    /// The weekdays this length covers, in order.
    pub fn weekdays(self) -> &'static [Weekday] {
        &Weekday::ALL[..self.day_count()]
    }
}

impl TryFrom<u8> for PlanLength {
    type Error = PlanLengthParseError;

    fn try_from(days: u8) -> Result<Self, Self::Error> {
        match days {
            5 => Ok(Self::FiveDay),
            7 => Ok(Self::SevenDay),
            other => Err(PlanLengthParseError(other)),
        }
    }
}

/// Error returned for a day count other than 5 or 7.
#[derive(Debug, Clone)]
pub struct PlanLengthParseError(pub u8);

impl fmt::Display for PlanLengthParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid plan length: {} (expected 5 or 7)", self.0)
    }
}

impl std::error::Error for PlanLengthParseError {}

// ---------------------------------------------------------------------------
// Slots
// ---------------------------------------------------------------------------

/// Which meal a slot belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Meal {
    Lunch,
    Dinner,
}

/// Position within one meal, in column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Course {
    Rice,
    Soup,
    Main,
    SideOne,
    SideTwo,
}

impl Course {
    const ALL: [Course; 5] = [
        Course::Rice,
        Course::Soup,
        Course::Main,
        Course::SideOne,
        Course::SideTwo,
    ];

    /// The dish category this course draws from.
    pub fn category(self) -> Category {
        match self {
            Self::Rice => Category::Rice,
            Self::Soup => Category::Soup,
            Self::Main => Category::Main,
            Self::SideOne | Self::SideTwo => Category::Side,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Rice => "Rice",
            Self::Soup => "Soup",
            Self::Main => "Main",
            Self::SideOne => "Side-1",
            Self::SideTwo => "Side-2",
        }
    }
}

/// One meal-slot column of the plan table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Slot {
    pub meal: Meal,
    pub course: Course,
}

impl Slot {
    pub fn new(meal: Meal, course: Course) -> Self {
        Self { meal, course }
    }

    /// The fixed column order for a plan of the given meal type: all lunch
    /// slots, then all dinner slots when dinner is requested.
    pub fn ordered(meal_type: MealType) -> Vec<Slot> {
        let mut slots: Vec<Slot> = Course::ALL
            .iter()
            .map(|&course| Slot::new(Meal::Lunch, course))
            .collect();
        if meal_type == MealType::LunchAndDinner {
            slots.extend(Course::ALL.iter().map(|&course| Slot::new(Meal::Dinner, course)));
        }
        slots
    }

    /// The dish category this slot draws from.
    pub fn category(self) -> Category {
        self.course.category()
    }

    /// Rice slots hold the fixed literal dish and are exempt from
    /// substitution.
    pub fn is_rice(self) -> bool {
        self.course == Course::Rice
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.meal {
            Meal::Lunch => f.write_str(self.course.label()),
            Meal::Dinner => write!(f, "Dinner-{}", self.course.label()),
        }
    }
}

impl FromStr for Slot {
    type Err = SlotParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (meal, rest) = match s.strip_prefix("Dinner-") {
            Some(rest) => (Meal::Dinner, rest),
            None => (Meal::Lunch, s),
        };
        let course = match rest {
            "Rice" => Course::Rice,
            "Soup" => Course::Soup,
            "Main" => Course::Main,
            "Side-1" => Course::SideOne,
            "Side-2" => Course::SideTwo,
            _ => return Err(SlotParseError(s.to_owned())),
        };
        Ok(Slot::new(meal, course))
    }
}

impl From<Slot> for String {
    fn from(slot: Slot) -> Self {
        slot.to_string()
    }
}

impl TryFrom<String> for Slot {
    type Error = SlotParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Error returned when parsing an invalid [`Slot`] label.
#[derive(Debug, Clone)]
pub struct SlotParseError(pub String);

impl fmt::Display for SlotParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid slot label: {:?}", self.0)
    }
}

impl std::error::Error for SlotParseError {}

// ---------------------------------------------------------------------------
// Plan structure
// ---------------------------------------------------------------------------

/// One cell of the plan table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotEntry {
    pub slot: Slot,
    pub dish: String,
}

/// One row of the plan table: a day and its ordered slot assignments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayMenu {
    pub day: Weekday,
    pub entries: Vec<SlotEntry>,
}

impl DayMenu {
    /// The dish currently assigned to a slot, if that column exists.
    pub fn dish(&self, slot: Slot) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.slot == slot)
            .map(|e| e.dish.as_str())
    }

    /// Overwrite the dish in a slot. Ignores slots the plan does not have.
    pub fn set_dish(&mut self, slot: Slot, dish: impl Into<String>) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.slot == slot) {
            entry.dish = dish.into();
        }
    }
}

/// A full weekly plan: the interchange shape of every core component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealPlan {
    pub meal_type: MealType,
    pub days: Vec<DayMenu>,
}

impl MealPlan {
    /// True when every slot holds a non-empty dish name. Generated plans
    /// always satisfy this; reconstructed plans may not until normalized.
    pub fn is_complete(&self) -> bool {
        let expected = Slot::ordered(self.meal_type);
        self.days.iter().all(|day| {
            expected
                .iter()
                .all(|&slot| day.dish(slot).is_some_and(|d| !d.is_empty()))
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekday_display_roundtrip() {
        for v in &Weekday::ALL {
            let parsed: Weekday = v.to_string().parse().expect("should parse");
            assert_eq!(*v, parsed);
        }
    }

    #[test]
    fn weekday_invalid() {
        assert!("Funday".parse::<Weekday>().is_err());
    }

    #[test]
    fn meal_type_display_roundtrip() {
        for v in [MealType::LunchOnly, MealType::LunchAndDinner] {
            let parsed: MealType = v.to_string().parse().expect("should parse");
            assert_eq!(v, parsed);
        }
    }

    #[test]
    fn plan_length_from_day_count() {
        assert_eq!(PlanLength::try_from(5).unwrap(), PlanLength::FiveDay);
        assert_eq!(PlanLength::try_from(7).unwrap(), PlanLength::SevenDay);
        assert!(PlanLength::try_from(6).is_err());
    }

    #[test]
    fn plan_length_weekdays_truncate_in_order() {
        assert_eq!(
            PlanLength::FiveDay.weekdays(),
            &[
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri
            ]
        );
        assert_eq!(PlanLength::SevenDay.weekdays().len(), 7);
    }

    #[test]
    fn lunch_only_slot_order() {
        let labels: Vec<String> = Slot::ordered(MealType::LunchOnly)
            .iter()
            .map(Slot::to_string)
            .collect();
        assert_eq!(labels, vec!["Rice", "Soup", "Main", "Side-1", "Side-2"]);
    }

    #[test]
    fn lunch_and_dinner_slot_order_appends_dinner_mirror() {
        let labels: Vec<String> = Slot::ordered(MealType::LunchAndDinner)
            .iter()
            .map(Slot::to_string)
            .collect();
        assert_eq!(
            labels,
            vec![
                "Rice",
                "Soup",
                "Main",
                "Side-1",
                "Side-2",
                "Dinner-Rice",
                "Dinner-Soup",
                "Dinner-Main",
                "Dinner-Side-1",
                "Dinner-Side-2"
            ]
        );
    }

    #[test]
    fn slot_label_roundtrip() {
        for slot in Slot::ordered(MealType::LunchAndDinner) {
            let parsed: Slot = slot.to_string().parse().expect("should parse");
            assert_eq!(slot, parsed);
        }
    }

    #[test]
    fn slot_invalid_label() {
        assert!("Dessert".parse::<Slot>().is_err());
        assert!("Dinner-Dessert".parse::<Slot>().is_err());
    }

    #[test]
    fn slot_categories() {
        assert_eq!("Rice".parse::<Slot>().unwrap().category(), Category::Rice);
        assert_eq!("Soup".parse::<Slot>().unwrap().category(), Category::Soup);
        assert_eq!(
            "Dinner-Side-2".parse::<Slot>().unwrap().category(),
            Category::Side
        );
    }

    #[test]
    fn day_menu_get_and_set() {
        let soup = Slot::new(Meal::Lunch, Course::Soup);
        let mut day = DayMenu {
            day: Weekday::Mon,
            entries: vec![SlotEntry {
                slot: soup,
                dish: "된장국".to_owned(),
            }],
        };

        assert_eq!(day.dish(soup), Some("된장국"));
        day.set_dish(soup, "미역국");
        assert_eq!(day.dish(soup), Some("미역국"));

        // Setting a slot the day does not have is a no-op.
        day.set_dish(Slot::new(Meal::Dinner, Course::Soup), "x");
        assert_eq!(day.entries.len(), 1);
    }

    #[test]
    fn plan_json_uses_canonical_labels() {
        let plan = MealPlan {
            meal_type: MealType::LunchOnly,
            days: vec![DayMenu {
                day: Weekday::Mon,
                entries: vec![SlotEntry {
                    slot: Slot::new(Meal::Lunch, Course::SideOne),
                    dish: "콩나물무침".to_owned(),
                }],
            }],
        };

        let json = serde_json::to_string(&plan).unwrap();
        assert!(json.contains("\"lunch_only\""));
        assert!(json.contains("\"Mon\""));
        assert!(json.contains("\"Side-1\""));

        let back: MealPlan = serde_json::from_str(&json).unwrap();
        assert_eq!(back, plan);
    }

    #[test]
    fn is_complete_requires_every_slot() {
        let mut plan = MealPlan {
            meal_type: MealType::LunchOnly,
            days: vec![DayMenu {
                day: Weekday::Mon,
                entries: Slot::ordered(MealType::LunchOnly)
                    .into_iter()
                    .map(|slot| SlotEntry {
                        slot,
                        dish: "dish".to_owned(),
                    })
                    .collect(),
            }],
        };
        assert!(plan.is_complete());

        plan.days[0].entries[2].dish.clear();
        assert!(!plan.is_complete());
    }
}
