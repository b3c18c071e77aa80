//! Public transit journey planner server.
//!
//! A web application that answers: "I'm at this stop at this time,
//! what are the best ways to reach my destination?" Answers are
//! Pareto-optimal over (arrival time, number of transit legs).

pub mod domain;
pub mod geo;
pub mod planner;
pub mod timetable;
pub mod web;
