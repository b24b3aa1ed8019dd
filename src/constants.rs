/// User agent string for HTTP requests
pub const USER_AGENT: &str = "tour-planner/0.1.0";

/// WeatherAPI.com base URL
pub const WEATHER_API_BASE: &str = "http://api.weatherapi.com/v1";

/// Default Bolt endpoint of the preference graph
pub const DEFAULT_NEO4J_URI: &str = "bolt://localhost:7687";

pub const DEFAULT_NEO4J_USER: &str = "neo4j";

/// Default bind address for the itinerary HTTP endpoint
pub const DEFAULT_HTTP_ADDR: &str = "127.0.0.1:8000";

/// Upper bound on every outbound call (graph database and weather API)
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Cypher upsert for a user's preference record
pub const UPSERT_PREFERENCES: &str =
    "MERGE (u:User {id: $user_id}) SET u.preferences = $preferences";

/// Cypher point lookup of a user's preference record
pub const MATCH_PREFERENCES: &str =
    "MATCH (u:User {id: $user_id}) RETURN u.preferences AS preferences";
