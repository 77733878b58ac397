//! Small data trees for tests.

use std::fs;
use std::path::Path;

/// Write `(relative path, content)` pairs below `root`, creating directories.
pub fn write_tree(root: &Path, files: &[(&str, &str)]) {
    for (name, content) in files {
        let path = root.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }
}

/// Write [`SAMPLE`] below `root`.
pub fn write_sample(root: &Path) {
    write_tree(root, SAMPLE);
}

/// Two cities, three venues, two series and three events.
///
/// `brno-pyvo` recurs on the fourth Thursday of each month; its last event
/// is on 2024-06-27. `praha-pyvo` has no recurrence rule.
pub const SAMPLE: &[(&str, &str)] = &[
    ("meta.yaml", "version: 2\nignored_files:\n  - README.md\n"),
    ("README.md", "# Pyvo data\n"),
    (
        "cities/brno/city.yaml",
        "name: Brno\nlocation:\n  latitude: '49.1951'\n  longitude: '16.6068'\n",
    ),
    (
        "cities/brno/venues/u-dreveneho-orla.yaml",
        r#"name: U Dřevěného orla
city: brno
address: |
  Minská 17
  Brno
notes: Salonek vzadu
location:
  latitude: '49.2108'
  longitude: '16.5949'
"#,
    ),
    (
        "cities/brno/venues/hlavni-nadrazi.yaml",
        r#"name: Hlavní nádraží
city: brno
location:
  latitude: '49.1906'
  longitude: '16.6129'
"#,
    ),
    (
        "cities/praha/city.yaml",
        "name: Praha\nlocation:\n  latitude: '50.0880'\n  longitude: '14.4208'\n",
    ),
    (
        "cities/praha/venues/na-venecku.yaml",
        r#"name: Na Věnečku
city: praha
address: Lidická 8, Praha 5
location:
  latitude: '50.0706'
  longitude: '14.4048'
"#,
    ),
    (
        "series/brno-pyvo/series.yaml",
        r#"name: Brněnské Pyvo
city: brno
description:
  cs: Pravidelný sraz brněnských pythonistů
  en: Regular meetup of Brno Pythonistas
organizer-info:
  - name: Petr
    mail: petr@example.com
recurrence:
  rrule: RRULE:FREQ=MONTHLY;BYDAY=+4TH;BYHOUR=19;BYMINUTE=0;BYSECOND=0
  scheme: monthly
  description:
    cs: Každý čtvrtý čtvrtek v měsíci
    en: Every fourth Thursday of the month
"#,
    ),
    (
        "series/brno-pyvo/events/2024-05-23.yaml",
        r#"name: Brněnské Pyvo
number: 99
city: brno
venue: hlavni-nadrazi
start: 2024-05-23 19:00:00
"#,
    ),
    (
        "series/brno-pyvo/events/2024-06-27-web.yaml",
        r#"name: Brněnské Pyvo
number: 100
topic: Web
city: brno
venue: u-dreveneho-orla
start: 2024-06-27 19:30:00
description: Sté Pyvo
urls:
  - https://www.meetup.com/pyvo/events/100
talks:
  - title: Django v praxi
    description: Jak na to
    speakers:
      - Alice
    urls:
      - https://example.com/slides.pdf
    coverage:
      - video: https://www.youtube.com/watch?v=abcDEF_123
  - title: Bleskovka
    lightning: true
    speakers:
      - Bob
      - Carol
"#,
    ),
    (
        "series/praha-pyvo/series.yaml",
        r#"name: Pražské Pyvo
city: praha
description:
  cs: Pyvo v Praze
  en: null
organizer-info: []
"#,
    ),
    (
        "series/praha-pyvo/events/2024-06-19.yaml",
        r#"name: Pražské Pyvo
topic: Docker
city: praha
venue: na-venecku
start: 2024-06-19
"#,
    ),
];
