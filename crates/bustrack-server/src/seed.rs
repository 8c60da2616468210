// ── Demo fleet ──
//
// Six buses a fresh store starts with. Ids are the short strings the
// demo front-end always used.

use bustrack_core::{Bus, BusId, Stop};

struct SeedBus {
    id: &'static str,
    number: &'static str,
    route: &'static str,
    stops: &'static [(&'static str, &'static str)],
    current_location: &'static str,
    next_stop: &'static str,
    eta: &'static str,
    capacity: u32,
    occupancy: u32,
}

const FLEET: &[SeedBus] = &[
    SeedBus {
        id: "1",
        number: "101",
        route: "Downtown Express",
        stops: &[
            ("Central Station", "06:00"),
            ("City Hall", "06:15"),
            ("Main Street", "06:30"),
            ("Park Avenue", "06:45"),
            ("Shopping Center", "07:00"),
            ("University Campus", "07:15"),
            ("Hospital", "07:30"),
            ("Airport Terminal", "07:45"),
        ],
        current_location: "City Hall",
        next_stop: "Main Street",
        eta: "5 mins",
        capacity: 50,
        occupancy: 32,
    },
    SeedBus {
        id: "2",
        number: "102",
        route: "Northside Loop",
        stops: &[
            ("North Terminal", "06:30"),
            ("Residential District", "06:45"),
            ("School Zone", "07:00"),
            ("Community Center", "07:15"),
            ("Sports Complex", "07:30"),
            ("Library", "07:45"),
            ("North Terminal", "08:00"),
        ],
        current_location: "School Zone",
        next_stop: "Community Center",
        eta: "3 mins",
        capacity: 45,
        occupancy: 28,
    },
    SeedBus {
        id: "3",
        number: "103",
        route: "Southside Express",
        stops: &[
            ("South Station", "07:00"),
            ("Business District", "07:15"),
            ("Tech Park", "07:30"),
            ("Retail Plaza", "07:45"),
            ("Convention Center", "08:00"),
            ("Marina", "08:15"),
            ("Beach Resort", "08:30"),
        ],
        current_location: "Tech Park",
        next_stop: "Retail Plaza",
        eta: "7 mins",
        capacity: 55,
        occupancy: 41,
    },
    SeedBus {
        id: "4",
        number: "104",
        route: "East-West Connector",
        stops: &[
            ("West Terminal", "05:45"),
            ("Suburban Mall", "06:05"),
            ("Industrial Area", "06:25"),
            ("Central Hub", "06:45"),
            ("Business Center", "07:05"),
            ("East Terminal", "07:25"),
        ],
        current_location: "Central Hub",
        next_stop: "Business Center",
        eta: "4 mins",
        capacity: 60,
        occupancy: 48,
    },
    SeedBus {
        id: "5",
        number: "105",
        route: "Metro Circle",
        stops: &[
            ("Metro Center", "06:00"),
            ("Arts District", "06:20"),
            ("Financial Quarter", "06:40"),
            ("Old Town", "07:00"),
            ("Riverside", "07:20"),
            ("Metro Center", "07:40"),
        ],
        current_location: "Arts District",
        next_stop: "Financial Quarter",
        eta: "6 mins",
        capacity: 40,
        occupancy: 22,
    },
    SeedBus {
        id: "6",
        number: "106",
        route: "Airport Shuttle",
        stops: &[
            ("Airport Terminal 1", "05:30"),
            ("Airport Terminal 2", "05:45"),
            ("Hotel District", "06:00"),
            ("Conference Center", "06:15"),
            ("Downtown", "06:30"),
            ("Airport Terminal 1", "06:45"),
        ],
        current_location: "Hotel District",
        next_stop: "Conference Center",
        eta: "8 mins",
        capacity: 35,
        occupancy: 19,
    },
];

impl SeedBus {
    fn to_bus(&self) -> Bus {
        Bus {
            id: BusId::from(self.id),
            number: self.number.into(),
            route: self.route.into(),
            stops: self
                .stops
                .iter()
                .map(|(name, time)| Stop::new(*name, *time))
                .collect(),
            current_location: self.current_location.into(),
            next_stop: self.next_stop.into(),
            eta: self.eta.into(),
            capacity: self.capacity,
            occupancy: self.occupancy,
        }
    }
}

/// The demo fleet in display order.
pub fn demo_fleet() -> Vec<Bus> {
    FLEET.iter().map(SeedBus::to_bus).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fleet_has_six_buses_with_legacy_ids() {
        let fleet = demo_fleet();
        assert_eq!(fleet.len(), 6);
        let ids: Vec<String> = fleet.iter().map(|b| b.id.to_string()).collect();
        assert_eq!(ids, ["1", "2", "3", "4", "5", "6"]);
        assert!(fleet.iter().all(|b| !b.id.is_generated()));
    }

    #[test]
    fn downtown_express_matches_demo_record() {
        let bus = &demo_fleet()[0];
        assert_eq!(bus.number, "101");
        assert_eq!(bus.stops.len(), 8);
        assert_eq!(bus.stops[0], Stop::new("Central Station", "06:00"));
        assert_eq!(bus.stops[7], Stop::new("Airport Terminal", "07:45"));
        assert_eq!((bus.capacity, bus.occupancy), (50, 32));
    }

    #[test]
    fn every_route_has_stops() {
        assert!(demo_fleet().iter().all(|b| !b.stops.is_empty()));
    }
}
