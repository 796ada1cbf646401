pub mod river_farm;
