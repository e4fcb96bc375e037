use wasm_bindgen::prelude::*;
use starhop_engine::*;

mod game;
use game::GalaxyMap;

starhop_web::export_game!(GalaxyMap, "galaxy-map", vectors);
