/// The five NYC boroughs, keyed by the county names the ACS uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Borough {
    Manhattan,
    Bronx,
    Brooklyn,
    Queens,
    StatenIsland,
}

impl Borough {
    pub fn from_county(county: &str) -> Option<Borough> {
        match county.trim() {
            "New York County" => Some(Borough::Manhattan),
            "Bronx County" => Some(Borough::Bronx),
            "Kings County" => Some(Borough::Brooklyn),
            "Queens County" => Some(Borough::Queens),
            "Richmond County" => Some(Borough::StatenIsland),
            _ => None,
        }
    }

    /// `BoroCode` as used by the city's tract dataset.
    pub fn code(self) -> &'static str {
        match self {
            Borough::Manhattan => "1",
            Borough::Bronx => "2",
            Borough::Brooklyn => "3",
            Borough::Queens => "4",
            Borough::StatenIsland => "5",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Borough::Manhattan => "Manhattan",
            Borough::Bronx => "Bronx",
            Borough::Brooklyn => "Brooklyn",
            Borough::Queens => "Queens",
            Borough::StatenIsland => "Staten Island",
        }
    }
}

/// The pieces of an ACS `NAME` such as `Census Tract 1.02; Bronx County; New York`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TractName {
    /// `1.02`; empty when the first segment isn't a `Census Tract` label.
    pub tract_number: String,
    pub county: String,
    pub borough: Option<Borough>,
}

impl TractName {
    pub fn parse(name: &str) -> TractName {
        let mut parts = name.split(';').map(str::trim);
        let tract_info = parts.next().unwrap_or_default();
        let county = parts.next().unwrap_or_default();

        let tract_number = if tract_info.contains("Census Tract") {
            tract_info.replace("Census Tract", "").trim().to_string()
        } else {
            String::new()
        };

        TractName {
            tract_number,
            county: county.to_string(),
            borough: Borough::from_county(county),
        }
    }

    pub fn boro_code(&self) -> &'static str {
        self.borough.map(Borough::code).unwrap_or_default()
    }

    pub fn boro_name(&self) -> &'static str {
        self.borough.map(Borough::name).unwrap_or_default()
    }

    /// `BoroCT2020`: borough code followed by the tract number, or empty if
    /// either is unknown.
    pub fn boro_ct(&self) -> String {
        let code = self.boro_code();
        if code.is_empty() || self.tract_number.is_empty() {
            String::new()
        } else {
            format!("{code}{}", self.tract_number)
        }
    }
}
