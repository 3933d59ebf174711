//! Static GO Transit route reference data
//!
//! The live feeds identify lines by short codes. This module maps them to the
//! names riders know.

/// Whether a route is a train line or a bus route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    Train,
    Bus,
}

/// A GO Transit route as published in the GTFS feed
#[derive(Debug, Clone, Copy)]
pub struct Route {
    /// Short code used by the live feeds (e.g. "LW", "41")
    pub code: &'static str,
    /// Full route name
    pub name: &'static str,
    pub kind: RouteKind,
}

const fn train(code: &'static str, name: &'static str) -> Route {
    Route {
        code,
        name,
        kind: RouteKind::Train,
    }
}

const fn bus(code: &'static str, name: &'static str) -> Route {
    Route {
        code,
        name,
        kind: RouteKind::Bus,
    }
}

/// All known GO Transit train lines and bus routes
pub static ROUTES: [Route; 44] = [
    train("ST", "Stouffville"),
    train("RH", "Richmond Hill"),
    train("MI", "Milton"),
    train("LW", "Lakeshore West"),
    train("LE", "Lakeshore East"),
    train("KI", "Kitchener"),
    train("BR", "Barrie"),
    train("GT", "GO Train"),
    bus("96", "Oshawa / Finch Express"),
    bus("94", "Pickering / Square One"),
    bus("92", "Oshawa / Yorkdale"),
    bus("90", "Lakeshore East"),
    bus("88", "Peterborough / Oshawa"),
    bus("71", "Stouffville"),
    bus("70", "Uxbridge / Mount Joy"),
    bus("68", "Barrie / Newmarket"),
    bus("67", "Keswick / North York"),
    bus("65", "Newmarket / Toronto"),
    bus("61", "Richmond Hill"),
    bus("56", "Oshawa / Oakville"),
    bus("52", "Oshawa / Hwy 407 Terminal"),
    bus("48", "Guelph / Hwy 407 Terminal"),
    bus("47", "Hamilton / Hwy 407 Terminal"),
    bus("41", "Hamilton / Pickering"),
    bus("40", "Hamilton / Richmond Hill"),
    bus("38", "Bolton / Malton"),
    bus("37", "Orangeville / Brampton"),
    bus("36", "Brampton / North York Express"),
    bus("33", "Guelph / North York"),
    bus("32", "Brampton Trinity Common / North York"),
    bus("31", "Guelph / Toronto"),
    bus("30", "Kitchener / Bramalea"),
    bus("29", "Guelph / Mississauga"),
    bus("27", "Milton / North York"),
    bus("25", "Waterloo / Mississauga"),
    bus("22", "Milton / Oakville"),
    bus("21", "Milton"),
    bus("19", "Mississauga / North York"),
    bus("18", "Lakeshore West"),
    bus("17", "Waterloo / Hamilton"),
    bus("16", "Hamilton / Toronto Express"),
    bus("15", "Brantford / Aldershot"),
    bus("12", "Niagara Falls / Toronto"),
    bus("11", "Brock University"),
];

/// Looks up a route by its code (exact match)
pub fn get_route(code: &str) -> Option<&'static Route> {
    ROUTES.iter().find(|r| r.code == code)
}

/// Returns the full route name for a code, or `Route {code}` when unknown
pub fn route_name(code: &str) -> String {
    match get_route(code.trim()) {
        Some(route) => route.name.to_string(),
        None => format!("Route {}", code),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_name_for_train_line() {
        assert_eq!(route_name("LW"), "Lakeshore West");
        assert_eq!(route_name("ST"), "Stouffville");
    }

    #[test]
    fn test_route_name_for_bus_route() {
        assert_eq!(route_name("41"), "Hamilton / Pickering");
        assert_eq!(route_name("11"), "Brock University");
    }

    #[test]
    fn test_route_name_falls_back_for_unknown_code() {
        assert_eq!(route_name("ZZ"), "Route ZZ");
        assert_eq!(route_name(""), "Route ");
    }

    #[test]
    fn test_route_lookup_is_case_sensitive() {
        assert!(get_route("lw").is_none());
        assert_eq!(get_route("LW").map(|r| r.kind), Some(RouteKind::Train));
        assert_eq!(get_route("96").map(|r| r.kind), Some(RouteKind::Bus));
    }

    #[test]
    fn test_route_codes_are_unique() {
        let mut codes: Vec<&str> = ROUTES.iter().map(|r| r.code).collect();
        codes.sort();
        let original_len = codes.len();
        codes.dedup();
        assert_eq!(codes.len(), original_len, "Route codes are not unique");
    }
}
