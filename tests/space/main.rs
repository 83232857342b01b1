mod concurrency;
mod conditions;
mod distributions;
mod forbidden;
mod sampling;
mod scenarios;
