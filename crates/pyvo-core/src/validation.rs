//! Closed-schema validation of a built [`Root`].
//!
//! Every entity declares its attributes as static data ([`Schema`]) and
//! exposes its runtime values through [`Inspect`]. A single walker compares
//! the two recursively and reports the first violation with the full
//! attribute path, e.g. `.series['brno-pyvo'].events[3].venue`.

use std::collections::HashSet;
use std::path::Path;

use chrono::DateTime;
use chrono_tz::Tz;

use crate::city::{City, Location, Venue};
use crate::error::ValidationError;
use crate::event::{Event, EventLink, Speaker, Talk, TalkLink};
use crate::recurrence::parse_rule;
use crate::root::Root;
use crate::series::{Organizer, Recurrence, Series};
use crate::time::TIMEZONE;

/// Arena an id points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    City,
    Venue,
    Series,
    Event,
    Talk,
}

impl Entity {
    pub fn name(self) -> &'static str {
        match self {
            Entity::City => "city",
            Entity::Venue => "venue",
            Entity::Series => "series",
            Entity::Event => "event",
            Entity::Talk => "talk",
        }
    }

    fn arena_len(self, root: &Root) -> usize {
        match self {
            Entity::City => root.cities.len(),
            Entity::Venue => root.venues.len(),
            Entity::Series => root.series.len(),
            Entity::Event => root.events.len(),
            Entity::Talk => root.talks.len(),
        }
    }
}

/// Declared shape of one attribute.
#[derive(Debug)]
pub enum Kind {
    Str,
    Int,
    Bool,
    DateTime,
    Path,
    /// A recurrence rule string that must parse.
    Rule,
    /// An id into one of the root arenas.
    Ref(Entity),
    Optional(&'static Kind),
    List(&'static Kind),
    Map(&'static Kind, &'static Kind),
    Object(&'static Schema),
}

impl Kind {
    fn describe(&self) -> String {
        match self {
            Kind::Str => "str".to_string(),
            Kind::Int => "int".to_string(),
            Kind::Bool => "bool".to_string(),
            Kind::DateTime => "datetime".to_string(),
            Kind::Path => "path".to_string(),
            Kind::Rule => "recurrence rule".to_string(),
            Kind::Ref(entity) => format!("ref<{}>", entity.name()),
            Kind::Optional(inner) => format!("Option<{}>", inner.describe()),
            Kind::List(inner) => format!("List<{}>", inner.describe()),
            Kind::Map(key, value) => format!("Map<{}, {}>", key.describe(), value.describe()),
            Kind::Object(schema) => schema.name.to_string(),
        }
    }
}

/// The declared attributes of one entity type.
#[derive(Debug)]
pub struct Schema {
    pub name: &'static str,
    pub fields: &'static [(&'static str, Kind)],
}

/// A runtime attribute value, as seen by the walker.
pub enum Value<'a> {
    Null,
    Str(&'a str),
    Int(i64),
    Bool(bool),
    DateTime(&'a DateTime<Tz>),
    Path(&'a Path),
    Rule(&'a str),
    Ref(Entity, usize),
    List(Vec<Value<'a>>),
    Map(Vec<(Value<'a>, Value<'a>)>),
    Object(&'a dyn Inspect),
}

impl<'a> Value<'a> {
    fn opt_str(value: &'a Option<String>) -> Self {
        value.as_deref().map_or(Value::Null, Value::Str)
    }

    /// An owned child resolved through an arena; a missing slot stays a
    /// bare reference so the walker can report it as dangling.
    fn child<T: Inspect>(entity: Entity, index: usize, found: Option<&'a T>) -> Self {
        match found {
            Some(object) => Value::Object(object),
            None => Value::Ref(entity, index),
        }
    }

    fn describe(&self) -> String {
        match self {
            Value::Null => "None".to_string(),
            Value::Str(s) | Value::Rule(s) => format!("{s:?}"),
            Value::Int(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::DateTime(dt) => dt.to_rfc3339(),
            Value::Path(p) => format!("{:?}", p.display().to_string()),
            Value::Ref(entity, index) => format!("{} #{index}", entity.name()),
            Value::List(items) => format!("list of {}", items.len()),
            Value::Map(entries) => format!("map of {}", entries.len()),
            Value::Object(object) => format!("<{}>", object.schema().name),
        }
    }

    fn key_label(&self) -> String {
        match self {
            Value::Str(s) => format!("[{s:?}]").replace('"', "'"),
            other => format!("[{}]", other.describe()),
        }
    }
}

/// Implemented by every entity that takes part in validation.
pub trait Inspect {
    fn schema(&self) -> &'static Schema;

    fn attributes<'a>(&'a self, root: &'a Root) -> Vec<(&'static str, Value<'a>)>;
}

/// Validate the whole graph. Stops at the first violation.
pub fn validate(root: &Root) -> Result<(), ValidationError> {
    validate_object(root, root)
}

/// Validate one object and everything reachable from it.
pub fn validate_object(object: &dyn Inspect, root: &Root) -> Result<(), ValidationError> {
    Walker {
        root,
        seen: HashSet::new(),
    }
    .object(object, object.schema(), "")
}

struct Walker<'r> {
    root: &'r Root,
    /// Visited objects by address and type; a child may share its parent's
    /// address when it is the first field.
    seen: HashSet<(usize, &'static str)>,
}

impl Walker<'_> {
    fn check(&mut self, value: &Value<'_>, kind: &Kind, path: &str) -> Result<(), ValidationError> {
        match (kind, value) {
            (Kind::Optional(_), Value::Null) => Ok(()),
            (Kind::Optional(inner), _) => self.check(value, inner, path),
            (Kind::Str, Value::Str(_))
            | (Kind::Int, Value::Int(_))
            | (Kind::Bool, Value::Bool(_))
            | (Kind::Path, Value::Path(_)) => Ok(()),
            (Kind::DateTime, Value::DateTime(dt)) => {
                if dt.timezone() == TIMEZONE {
                    Ok(())
                } else {
                    Err(ValidationError::WrongTimezone {
                        path: path.to_string(),
                        value: dt.to_rfc3339(),
                        expected: TIMEZONE.name().to_string(),
                    })
                }
            }
            (Kind::Rule, Value::Rule(rule)) => match parse_rule(rule) {
                Ok(_) => Ok(()),
                Err(_) => Err(self.mismatch(value, kind, path)),
            },
            (Kind::Ref(expected), Value::Ref(entity, index)) if expected == entity => {
                self.in_bounds(*entity, *index, path)
            }
            (Kind::List(inner), Value::List(items)) => {
                for (i, item) in items.iter().enumerate() {
                    self.check(item, inner, &format!("{path}[{i}]"))?;
                }
                Ok(())
            }
            (Kind::Map(key_kind, value_kind), Value::Map(entries)) => {
                for (key, item) in entries {
                    let item_path = format!("{path}{}", key.key_label());
                    self.check(key, key_kind, &item_path)?;
                    self.check(item, value_kind, &item_path)?;
                }
                Ok(())
            }
            (Kind::Object(schema), Value::Object(object)) => self.object(*object, *schema, path),
            (Kind::Object(_), Value::Ref(entity, index)) => {
                self.in_bounds(*entity, *index, path)?;
                Err(self.mismatch(value, kind, path))
            }
            _ => Err(self.mismatch(value, kind, path)),
        }
    }

    fn object(
        &mut self,
        object: &dyn Inspect,
        schema: &'static Schema,
        path: &str,
    ) -> Result<(), ValidationError> {
        if !std::ptr::eq(object.schema(), schema) {
            return Err(ValidationError::TypeMismatch {
                path: path.to_string(),
                value: format!("<{}>", object.schema().name),
                expected: schema.name.to_string(),
            });
        }
        let identity = object as *const dyn Inspect as *const () as usize;
        if !self.seen.insert((identity, schema.name)) {
            return Ok(());
        }

        let attributes = object.attributes(self.root);
        let undeclared: Vec<String> = attributes
            .iter()
            .filter(|(name, _)| !schema.fields.iter().any(|(field, _)| field == name))
            .map(|(name, _)| name.to_string())
            .collect();
        if !undeclared.is_empty() {
            return Err(ValidationError::UndeclaredAttributes {
                path: path.to_string(),
                names: undeclared,
            });
        }

        for (field, kind) in schema.fields {
            let value = attributes
                .iter()
                .find(|(name, _)| name == field)
                .map(|(_, value)| value)
                .ok_or_else(|| ValidationError::MissingAttribute {
                    path: path.to_string(),
                    name: field.to_string(),
                })?;
            self.check(value, kind, &format!("{path}.{field}"))?;
        }
        Ok(())
    }

    fn in_bounds(&self, entity: Entity, index: usize, path: &str) -> Result<(), ValidationError> {
        if index < entity.arena_len(self.root) {
            Ok(())
        } else {
            Err(ValidationError::DanglingReference {
                path: path.to_string(),
                entity: entity.name(),
                index,
            })
        }
    }

    fn mismatch(&self, value: &Value<'_>, kind: &Kind, path: &str) -> ValidationError {
        ValidationError::TypeMismatch {
            path: path.to_string(),
            value: value.describe(),
            expected: kind.describe(),
        }
    }
}

const OPT_STR: Kind = Kind::Optional(&Kind::Str);

pub static ROOT: Schema = Schema {
    name: "Root",
    fields: &[
        ("cities", Kind::Map(&Kind::Str, &Kind::Object(&CITY))),
        ("venues", Kind::Map(&Kind::Str, &Kind::Ref(Entity::Venue))),
        ("series", Kind::Map(&Kind::Str, &Kind::Object(&SERIES))),
        ("events", Kind::List(&Kind::Object(&EVENT))),
    ],
};

pub static LOCATION: Schema = Schema {
    name: "Location",
    fields: &[("latitude", Kind::Str), ("longitude", Kind::Str)],
};

pub static CITY: Schema = Schema {
    name: "City",
    fields: &[
        ("name", Kind::Str),
        ("slug", Kind::Str),
        ("location", Kind::Object(&LOCATION)),
        ("venues", Kind::Map(&Kind::Str, &Kind::Object(&VENUE))),
    ],
};

pub static VENUE: Schema = Schema {
    name: "Venue",
    fields: &[
        ("name", Kind::Str),
        ("slug", Kind::Str),
        ("city", Kind::Ref(Entity::City)),
        ("address", OPT_STR),
        ("notes", OPT_STR),
        ("location", Kind::Object(&LOCATION)),
    ],
};

pub static ORGANIZER: Schema = Schema {
    name: "Organizer",
    fields: &[
        ("name", Kind::Str),
        ("phone", OPT_STR),
        ("mail", OPT_STR),
        ("web", OPT_STR),
    ],
};

pub static RECURRENCE: Schema = Schema {
    name: "Recurrence",
    fields: &[
        ("rule", Kind::Rule),
        ("scheme", Kind::Str),
        ("description_cs", OPT_STR),
        ("description_en", OPT_STR),
    ],
};

pub static SERIES: Schema = Schema {
    name: "Series",
    fields: &[
        ("name", Kind::Str),
        ("slug", Kind::Str),
        ("home_city", Kind::Ref(Entity::City)),
        ("description_cs", OPT_STR),
        ("description_en", OPT_STR),
        ("events", Kind::List(&Kind::Object(&EVENT))),
        ("organizers", Kind::List(&Kind::Object(&ORGANIZER))),
        ("recurrence", Kind::Optional(&Kind::Object(&RECURRENCE))),
        ("source", Kind::Path),
    ],
};

pub static EVENT_LINK: Schema = Schema {
    name: "EventLink",
    fields: &[("url", Kind::Str)],
};

pub static EVENT: Schema = Schema {
    name: "Event",
    fields: &[
        ("name", Kind::Str),
        ("venue", Kind::Optional(&Kind::Ref(Entity::Venue))),
        ("number", Kind::Optional(&Kind::Int)),
        ("topic", OPT_STR),
        ("city", Kind::Ref(Entity::City)),
        ("description", OPT_STR),
        ("start", Kind::DateTime),
        ("talks", Kind::List(&Kind::Object(&TALK))),
        ("links", Kind::List(&Kind::Object(&EVENT_LINK))),
        ("source", Kind::Path),
        ("series", Kind::Ref(Entity::Series)),
    ],
};

pub static SPEAKER: Schema = Schema {
    name: "Speaker",
    fields: &[("name", Kind::Str)],
};

pub static TALK_LINK: Schema = Schema {
    name: "TalkLink",
    fields: &[
        ("kind", OPT_STR),
        ("url", Kind::Str),
        ("talk", Kind::Ref(Entity::Talk)),
    ],
};

pub static TALK: Schema = Schema {
    name: "Talk",
    fields: &[
        ("title", Kind::Str),
        ("description", OPT_STR),
        ("links", Kind::List(&Kind::Object(&TALK_LINK))),
        ("speakers", Kind::List(&Kind::Object(&SPEAKER))),
        ("is_lightning", Kind::Bool),
        ("event", Kind::Ref(Entity::Event)),
    ],
};

impl Inspect for Root {
    fn schema(&self) -> &'static Schema {
        &ROOT
    }

    fn attributes<'a>(&'a self, root: &'a Root) -> Vec<(&'static str, Value<'a>)> {
        let cities = self
            .city_index
            .iter()
            .map(|(slug, id)| {
                (
                    Value::Str(slug.as_str()),
                    Value::child(Entity::City, id.0, root.cities.get(id.0)),
                )
            })
            .collect();
        let venues = self
            .venue_index
            .iter()
            .map(|(slug, id)| (Value::Str(slug.as_str()), Value::Ref(Entity::Venue, id.0)))
            .collect();
        let series = self
            .series_index
            .iter()
            .map(|(slug, id)| {
                (
                    Value::Str(slug.as_str()),
                    Value::child(Entity::Series, id.0, root.series.get(id.0)),
                )
            })
            .collect();
        let events = self
            .events
            .iter()
            .map(|event| Value::Object(event as &dyn Inspect))
            .collect();
        vec![
            ("cities", Value::Map(cities)),
            ("venues", Value::Map(venues)),
            ("series", Value::Map(series)),
            ("events", Value::List(events)),
        ]
    }
}

impl Inspect for Location {
    fn schema(&self) -> &'static Schema {
        &LOCATION
    }

    fn attributes<'a>(&'a self, _root: &'a Root) -> Vec<(&'static str, Value<'a>)> {
        vec![
            ("latitude", Value::Str(&self.latitude)),
            ("longitude", Value::Str(&self.longitude)),
        ]
    }
}

impl Inspect for City {
    fn schema(&self) -> &'static Schema {
        &CITY
    }

    fn attributes<'a>(&'a self, root: &'a Root) -> Vec<(&'static str, Value<'a>)> {
        let venues = self
            .venues
            .iter()
            .map(|(slug, id)| {
                (
                    Value::Str(slug.as_str()),
                    Value::child(Entity::Venue, id.0, root.venues.get(id.0)),
                )
            })
            .collect();
        vec![
            ("name", Value::Str(&self.name)),
            ("slug", Value::Str(&self.slug)),
            ("location", Value::Object(&self.location)),
            ("venues", Value::Map(venues)),
        ]
    }
}

impl Inspect for Venue {
    fn schema(&self) -> &'static Schema {
        &VENUE
    }

    fn attributes<'a>(&'a self, _root: &'a Root) -> Vec<(&'static str, Value<'a>)> {
        vec![
            ("name", Value::Str(&self.name)),
            ("slug", Value::Str(&self.slug)),
            ("city", Value::Ref(Entity::City, self.city.0)),
            ("address", Value::opt_str(&self.address)),
            ("notes", Value::opt_str(&self.notes)),
            ("location", Value::Object(&self.location)),
        ]
    }
}

impl Inspect for Organizer {
    fn schema(&self) -> &'static Schema {
        &ORGANIZER
    }

    fn attributes<'a>(&'a self, _root: &'a Root) -> Vec<(&'static str, Value<'a>)> {
        vec![
            ("name", Value::Str(&self.name)),
            ("phone", Value::opt_str(&self.phone)),
            ("mail", Value::opt_str(&self.mail)),
            ("web", Value::opt_str(&self.web)),
        ]
    }
}

impl Inspect for Recurrence {
    fn schema(&self) -> &'static Schema {
        &RECURRENCE
    }

    fn attributes<'a>(&'a self, _root: &'a Root) -> Vec<(&'static str, Value<'a>)> {
        vec![
            ("rule", Value::Rule(&self.rule)),
            ("scheme", Value::Str(&self.scheme)),
            ("description_cs", Value::opt_str(&self.description_cs)),
            ("description_en", Value::opt_str(&self.description_en)),
        ]
    }
}

impl Inspect for Series {
    fn schema(&self) -> &'static Schema {
        &SERIES
    }

    fn attributes<'a>(&'a self, root: &'a Root) -> Vec<(&'static str, Value<'a>)> {
        let events = self
            .events
            .iter()
            .map(|id| Value::child(Entity::Event, id.0, root.events.get(id.0)))
            .collect();
        let organizers = self
            .organizers
            .iter()
            .map(|o| Value::Object(o as &dyn Inspect))
            .collect();
        let recurrence = match &self.recurrence {
            Some(recurrence) => Value::Object(recurrence),
            None => Value::Null,
        };
        vec![
            ("name", Value::Str(&self.name)),
            ("slug", Value::Str(&self.slug)),
            ("home_city", Value::Ref(Entity::City, self.home_city.0)),
            ("description_cs", Value::opt_str(&self.description_cs)),
            ("description_en", Value::opt_str(&self.description_en)),
            ("events", Value::List(events)),
            ("organizers", Value::List(organizers)),
            ("recurrence", recurrence),
            ("source", Value::Path(&self.source)),
        ]
    }
}

impl Inspect for EventLink {
    fn schema(&self) -> &'static Schema {
        &EVENT_LINK
    }

    fn attributes<'a>(&'a self, _root: &'a Root) -> Vec<(&'static str, Value<'a>)> {
        vec![("url", Value::Str(&self.url))]
    }
}

impl Inspect for Event {
    fn schema(&self) -> &'static Schema {
        &EVENT
    }

    fn attributes<'a>(&'a self, root: &'a Root) -> Vec<(&'static str, Value<'a>)> {
        let talks = self
            .talks
            .iter()
            .map(|id| Value::child(Entity::Talk, id.0, root.talks.get(id.0)))
            .collect();
        let links = self
            .links
            .iter()
            .map(|l| Value::Object(l as &dyn Inspect))
            .collect();
        vec![
            ("name", Value::Str(&self.name)),
            (
                "venue",
                self.venue
                    .map_or(Value::Null, |id| Value::Ref(Entity::Venue, id.0)),
            ),
            ("number", self.number.map_or(Value::Null, Value::Int)),
            ("topic", Value::opt_str(&self.topic)),
            ("city", Value::Ref(Entity::City, self.city.0)),
            ("description", Value::opt_str(&self.description)),
            ("start", Value::DateTime(&self.start)),
            ("talks", Value::List(talks)),
            ("links", Value::List(links)),
            ("source", Value::Path(&self.source)),
            ("series", Value::Ref(Entity::Series, self.series.0)),
        ]
    }
}

impl Inspect for Speaker {
    fn schema(&self) -> &'static Schema {
        &SPEAKER
    }

    fn attributes<'a>(&'a self, _root: &'a Root) -> Vec<(&'static str, Value<'a>)> {
        vec![("name", Value::Str(&self.name))]
    }
}

impl Inspect for TalkLink {
    fn schema(&self) -> &'static Schema {
        &TALK_LINK
    }

    fn attributes<'a>(&'a self, _root: &'a Root) -> Vec<(&'static str, Value<'a>)> {
        vec![
            ("kind", Value::opt_str(&self.kind)),
            ("url", Value::Str(&self.url)),
            ("talk", Value::Ref(Entity::Talk, self.talk.0)),
        ]
    }
}

impl Inspect for Talk {
    fn schema(&self) -> &'static Schema {
        &TALK
    }

    fn attributes<'a>(&'a self, _root: &'a Root) -> Vec<(&'static str, Value<'a>)> {
        let links = self
            .links
            .iter()
            .map(|l| Value::Object(l as &dyn Inspect))
            .collect();
        let speakers = self
            .speakers
            .iter()
            .map(|s| Value::Object(s as &dyn Inspect))
            .collect();
        vec![
            ("title", Value::Str(&self.title)),
            ("description", Value::opt_str(&self.description)),
            ("links", Value::List(links)),
            ("speakers", Value::List(speakers)),
            ("is_lightning", Value::Bool(self.is_lightning)),
            ("event", Value::Ref(Entity::Event, self.event.0)),
        ]
    }
}
