//! Scenario tests spanning several modules

mod broadcast_scenarios;
