//! Stack topology derivation.
//!
//! Pure helpers that turn the operator's answers about the stack into the
//! strings the command templates need:
//!
//! - [`port_range`] builds the edge-port range expression for a stack size
//! - [`classify_uplink`] parses an uplink specifier and decides whether the
//!   uplink is copper or fiber
//!
//! Port numbering follows the EXOS convention used by the supported switch
//! family: ports below 49 are copper, 49 and above are SFP/SFP+ fiber.

use std::fmt;

use thiserror::Error;

/// Largest stack EXOS SummitStack supports.
pub const MAX_STACK_SIZE: u8 = 8;

/// Returned by [`port_range`] for stack sizes outside `1..=8`.
pub const FALLBACK_PORT_RANGE: &str = "1-48";

/// First port number that is fiber rather than copper.
pub const FIRST_FIBER_PORT: u16 = 49;

/// Number of edge ports per switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgePorts {
    Twelve,
    TwentyFour,
    FortyEight,
}

impl EdgePorts {
    /// Map an operator-entered count to a supported value.
    pub fn from_count(count: u16) -> Option<Self> {
        match count {
            12 => Some(Self::Twelve),
            24 => Some(Self::TwentyFour),
            48 => Some(Self::FortyEight),
            _ => None,
        }
    }

    pub fn count(self) -> u16 {
        match self {
            Self::Twelve => 12,
            Self::TwentyFour => 24,
            Self::FortyEight => 48,
        }
    }
}

impl fmt::Display for EdgePorts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.count())
    }
}

/// How a single (unstacked) switch is addressed in a port range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeStyle {
    /// A standalone switch uses bare port numbers (`1-24`).
    Standalone,
    /// Every switch, even a standalone one, is slot-qualified (`1:1-48`).
    Slotted,
}

/// Build the edge-port range expression for a stack.
///
/// Stacks produce one `slot:1-N` token per member, comma-joined. A single
/// switch uses `1-N` or `1:1-N` depending on `style`. Sizes outside `1..=8`
/// return [`FALLBACK_PORT_RANGE`].
pub fn port_range(switch_count: u8, edge_ports: EdgePorts, style: RangeStyle) -> String {
    match switch_count {
        1 if style == RangeStyle::Standalone => format!("1-{edge_ports}"),
        1..=MAX_STACK_SIZE => (1..=switch_count)
            .map(|slot| format!("{slot}:1-{edge_ports}"))
            .collect::<Vec<_>>()
            .join(","),
        _ => FALLBACK_PORT_RANGE.to_string(),
    }
}

/// Physical medium of the uplink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Medium {
    Copper,
    Fiber,
}

impl Medium {
    pub fn is_copper(self) -> bool {
        self == Self::Copper
    }
}

impl fmt::Display for Medium {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Copper => f.write_str("copper"),
            Self::Fiber => f.write_str("fiber"),
        }
    }
}

/// A validated uplink specifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Uplink {
    /// Port list as it will appear in commands.
    pub ports: String,
    /// Derived medium.
    pub medium: Medium,
}

/// Reasons an uplink specifier is rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UplinkError {
    #[error("no uplink port entered")]
    Empty,

    #[error("since there is more than one switch in the stack, use the slot:port format (i.e. 1:48), got '{0}'")]
    SlotRequired(String),

    #[error("'{0}' is not a port number")]
    InvalidPort(String),
}

/// Parse and classify an uplink specifier.
///
/// A single switch accepts a bare port (`10`) or `slot:port` (`1:52`, which is
/// reduced to `52`). A stack requires comma-separated `slot:port` tokens. The
/// uplink is copper if any referenced port is below [`FIRST_FIBER_PORT`].
pub fn classify_uplink(spec: &str, switch_count: u8) -> Result<Uplink, UplinkError> {
    let spec = spec.trim();
    if spec.is_empty() {
        return Err(UplinkError::Empty);
    }

    if switch_count <= 1 {
        let port_text = match spec.split_once(':') {
            Some((_, port)) => port,
            None => spec,
        };
        let port = parse_port(port_text)?;
        return Ok(Uplink {
            ports: port.to_string(),
            medium: medium_for(&[port]),
        });
    }

    let mut ports = Vec::new();
    for token in spec.split(',') {
        let token = token.trim();
        let Some((slot, port)) = token.split_once(':') else {
            return Err(UplinkError::SlotRequired(token.to_string()));
        };
        parse_port(slot)?;
        ports.push(parse_port(port)?);
    }

    Ok(Uplink {
        ports: spec.split(',').map(str::trim).collect::<Vec<_>>().join(","),
        medium: medium_for(&ports),
    })
}

fn parse_port(text: &str) -> Result<u16, UplinkError> {
    let text = text.trim();
    text.parse::<u16>()
        .map_err(|_| UplinkError::InvalidPort(text.to_string()))
}

fn medium_for(ports: &[u16]) -> Medium {
    if ports.iter().any(|&port| port < FIRST_FIBER_PORT) {
        Medium::Copper
    } else {
        Medium::Fiber
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standalone_single_switch() {
        assert_eq!(port_range(1, EdgePorts::TwentyFour, RangeStyle::Standalone), "1-24");
        assert_eq!(port_range(1, EdgePorts::Twelve, RangeStyle::Standalone), "1-12");
    }

    #[test]
    fn test_slotted_single_switch() {
        assert_eq!(port_range(1, EdgePorts::FortyEight, RangeStyle::Slotted), "1:1-48");
    }

    #[test]
    fn test_stack_has_one_token_per_member() {
        for style in [RangeStyle::Standalone, RangeStyle::Slotted] {
            for edge in [EdgePorts::Twelve, EdgePorts::TwentyFour, EdgePorts::FortyEight] {
                for count in 2..=MAX_STACK_SIZE {
                    let range = port_range(count, edge, style);
                    let tokens: Vec<&str> = range.split(',').collect();
                    assert_eq!(tokens.len(), usize::from(count));
                    for (index, token) in tokens.iter().enumerate() {
                        assert_eq!(*token, format!("{}:1-{}", index + 1, edge.count()));
                    }
                }
            }
        }
    }

    #[test]
    fn test_three_member_stack() {
        assert_eq!(
            port_range(3, EdgePorts::FortyEight, RangeStyle::Standalone),
            "1:1-48,2:1-48,3:1-48"
        );
    }

    #[test]
    fn test_out_of_range_falls_back() {
        for count in [0, 9, 42, u8::MAX] {
            assert_eq!(
                port_range(count, EdgePorts::TwentyFour, RangeStyle::Standalone),
                FALLBACK_PORT_RANGE
            );
            assert_eq!(
                port_range(count, EdgePorts::FortyEight, RangeStyle::Slotted),
                FALLBACK_PORT_RANGE
            );
        }
    }

    #[test]
    fn test_edge_ports_from_count() {
        assert_eq!(EdgePorts::from_count(12), Some(EdgePorts::Twelve));
        assert_eq!(EdgePorts::from_count(48), Some(EdgePorts::FortyEight));
        assert_eq!(EdgePorts::from_count(36), None);
        assert_eq!(EdgePorts::from_count(0), None);
    }

    #[test]
    fn test_single_switch_copper_uplink() {
        let uplink = classify_uplink("10", 1).unwrap();
        assert_eq!(uplink.ports, "10");
        assert_eq!(uplink.medium, Medium::Copper);
    }

    #[test]
    fn test_single_switch_fiber_uplink() {
        let uplink = classify_uplink("52", 1).unwrap();
        assert_eq!(uplink.medium, Medium::Fiber);
        assert_eq!(classify_uplink("49", 1).unwrap().medium, Medium::Fiber);
        assert_eq!(classify_uplink("48", 1).unwrap().medium, Medium::Copper);
    }

    #[test]
    fn test_single_switch_slot_form_is_reduced() {
        let uplink = classify_uplink("1:52", 1).unwrap();
        assert_eq!(uplink.ports, "52");
        assert_eq!(uplink.medium, Medium::Fiber);
    }

    #[test]
    fn test_stack_any_copper_port_is_copper() {
        let uplink = classify_uplink("1:52,2:10", 3).unwrap();
        assert_eq!(uplink.ports, "1:52,2:10");
        assert_eq!(uplink.medium, Medium::Copper);
    }

    #[test]
    fn test_stack_all_fiber() {
        let uplink = classify_uplink("1:52, 2:51", 2).unwrap();
        assert_eq!(uplink.ports, "1:52,2:51");
        assert_eq!(uplink.medium, Medium::Fiber);
    }

    #[test]
    fn test_stack_single_token() {
        assert_eq!(classify_uplink("2:24", 2).unwrap().medium, Medium::Copper);
    }

    #[test]
    fn test_stack_requires_slot() {
        assert_eq!(
            classify_uplink("52", 2),
            Err(UplinkError::SlotRequired("52".to_string()))
        );
        assert_eq!(
            classify_uplink("1:52,51", 2),
            Err(UplinkError::SlotRequired("51".to_string()))
        );
    }

    #[test]
    fn test_malformed_ports_rejected() {
        assert_eq!(classify_uplink("", 1), Err(UplinkError::Empty));
        assert_eq!(
            classify_uplink("abc", 1),
            Err(UplinkError::InvalidPort("abc".to_string()))
        );
        assert_eq!(
            classify_uplink("1:,2:50", 2),
            Err(UplinkError::InvalidPort(String::new()))
        );
        assert!(classify_uplink("1:52,,2:50", 2).is_err());
    }
}
