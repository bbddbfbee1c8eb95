use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "kebab-case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(DoseStatus {
    Taken => "taken",
    Skipped => "skipped",
});

str_enum!(SlotStatus {
    Taken => "taken",
    Skipped => "skipped",
    Pending => "pending",
});

str_enum!(SlotUrgency {
    Overdue => "overdue",
    DueSoon => "due-soon",
    Scheduled => "scheduled",
});

impl From<DoseStatus> for SlotStatus {
    fn from(status: DoseStatus) -> Self {
        match status {
            DoseStatus::Taken => SlotStatus::Taken,
            DoseStatus::Skipped => SlotStatus::Skipped,
        }
    }
}
