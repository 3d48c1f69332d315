//! Status helper enums mapping to SMALLINT lookup tables.
//!
//! Each enum variant's discriminant matches the seed data (1-based) in the
//! corresponding lookup table.

/// Status ID type matching SMALLINT in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:expr ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// Return the database status ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }

            /// Map a database ID back to the enum, if it is known.
            pub fn from_id(id: StatusId) -> Option<Self> {
                match id {
                    $( $val => Some($name::$variant), )+
                    _ => None,
                }
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }
    };
}

define_status_enum! {
    /// Lifecycle of a sealed bid (`bid_statuses`).
    BidStatus {
        Pending = 1,
        Won = 2,
        Lost = 3,
        /// Never persisted: ignored bids are deleted during settlement.
        Ignored = 4,
        Invalid = 5,
        Purchase = 6,
    }
}

define_status_enum! {
    /// How a studio film was acquired (`acquired_types`).
    AcquiredType {
        Drafted = 1,
        WonBid = 2,
        Traded = 3,
        Purchased = 4,
        AdminAdded = 5,
    }
}

define_status_enum! {
    /// Activity feed entry kind (`activity_types`).
    ActivityType {
        Swap = 1,
        Purchase = 2,
        Drop = 3,
        BidWon = 4,
        StudioUpdate = 5,
        AdminAction = 6,
        Automated = 7,
        DraftPick = 8,
    }
}

impl From<bmb_core::settlement::BidOutcome> for BidStatus {
    fn from(outcome: bmb_core::settlement::BidOutcome) -> Self {
        use bmb_core::settlement::BidOutcome;
        match outcome {
            BidOutcome::Won => BidStatus::Won,
            BidOutcome::Lost => BidStatus::Lost,
            BidOutcome::Invalid => BidStatus::Invalid,
            BidOutcome::Ignored => BidStatus::Ignored,
        }
    }
}
