use std::fmt;

/// A city name taken from a single chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherQuery {
    pub city: String,
}

impl WeatherQuery {
    pub fn new(city: impl Into<String>) -> Self {
        Self { city: city.into() }
    }
}

/// Current conditions resolved by a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherResult {
    pub location_name: String,
    pub condition: String,
    pub temperature_c: f64,
}

impl fmt::Display for WeatherResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Weather in {}: {}, {:.1}°C",
            self.location_name, self.condition, self.temperature_c
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_one_decimal_temperature() {
        let result = WeatherResult {
            location_name: "London".into(),
            condition: "Cloudy".into(),
            temperature_c: 15.3,
        };
        assert_eq!(result.to_string(), "Weather in London: Cloudy, 15.3°C");
    }

    #[test]
    fn pads_and_rounds_temperature() {
        let whole = WeatherResult {
            location_name: "Oslo".into(),
            condition: "Snow".into(),
            temperature_c: -2.0,
        };
        assert_eq!(whole.to_string(), "Weather in Oslo: Snow, -2.0°C");

        let long = WeatherResult { temperature_c: 21.66, ..whole };
        assert_eq!(long.to_string(), "Weather in Oslo: Snow, 21.7°C");
    }
}
