//! Reporting views created after every table is loaded

use crate::config::ViewDefinition;

/// Stations that appear on more than one line
const JUNCTION_QUERY: &str = "SELECT station.* FROM kilo NATURAL JOIN station \
     GROUP BY kilo.stationid HAVING count(*) > 1";

/// Every kilo row joined with its station (plus how many lines the station
/// connects to) and its line
const JOINTKILO_QUERY: &str = "SELECT * FROM (SELECT station.*, count(*) AS connectcount \
     FROM station NATURAL JOIN kilo GROUP BY kilo.stationid) AS station \
     NATURAL JOIN kilo NATURAL JOIN line";

pub fn default_views() -> Vec<ViewDefinition> {
    vec![
        ViewDefinition::new("junction", JUNCTION_QUERY),
        ViewDefinition::new("jointkilo", JOINTKILO_QUERY),
    ]
}
