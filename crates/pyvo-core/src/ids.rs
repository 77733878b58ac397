//! Typed indices into the arenas owned by [`crate::Root`].

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub(crate) usize);

        impl $name {
            pub fn index(self) -> usize {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($label, "-{}"), self.0)
            }
        }
    };
}

arena_id!(
    /// Index of a city in the root arena.
    CityId,
    "city"
);
arena_id!(
    /// Index of a venue in the root arena.
    VenueId,
    "venue"
);
arena_id!(
    /// Index of a series in the root arena.
    SeriesId,
    "series"
);
arena_id!(
    /// Index of an event; events are stored sorted by start.
    EventId,
    "event"
);
arena_id!(
    /// Index of a talk in the root arena.
    TalkId,
    "talk"
);
