use serde::{Deserialize, Serialize, Serializer};

/// A movie as stored and served by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: String,
    pub title: String,
    pub year: i32,
    pub director: String,
    pub duration: u32,
    #[serde(serialize_with = "serialize_score")]
    pub rate: f64,
    pub poster: String,
    pub genre: Vec<String>,
}

/// Fully validated creation payload. `rate` is already defaulted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMovie {
    pub title: String,
    pub year: i32,
    pub director: String,
    pub duration: u32,
    pub rate: f64,
    pub poster: String,
    pub genre: Vec<String>,
}

/// Validated partial update. Absent fields leave the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MoviePatch {
    pub title: Option<String>,
    pub year: Option<i32>,
    pub director: Option<String>,
    pub duration: Option<u32>,
    pub rate: Option<f64>,
    pub poster: Option<String>,
    pub genre: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListMoviesQuery {
    pub genre: Option<String>,
}

impl ListMoviesQuery {
    /// The genre filter, treating an empty value as no filter.
    pub fn genre_filter(&self) -> Option<&str> {
        self.genre.as_deref().filter(|genre| !genre.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiMessage {
    pub message: String,
}

impl ApiMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Movie {
    pub fn from_new(id: impl Into<String>, movie: NewMovie) -> Self {
        Self {
            id: id.into(),
            title: movie.title,
            year: movie.year,
            director: movie.director,
            duration: movie.duration,
            rate: movie.rate,
            poster: movie.poster,
            genre: movie.genre,
        }
    }

    /// Shallow merge of the present patch fields. The id never changes.
    pub fn apply(&mut self, patch: MoviePatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(year) = patch.year {
            self.year = year;
        }
        if let Some(director) = patch.director {
            self.director = director;
        }
        if let Some(duration) = patch.duration {
            self.duration = duration;
        }
        if let Some(rate) = patch.rate {
            self.rate = rate;
        }
        if let Some(poster) = patch.poster {
            self.poster = poster;
        }
        if let Some(genre) = patch.genre {
            self.genre = genre;
        }
    }

    pub fn has_genre(&self, genre: &str) -> bool {
        let needle = genre.to_lowercase();
        self.genre
            .iter()
            .any(|candidate| candidate.to_lowercase() == needle)
    }
}

impl MoviePatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// Whole scores go out as integers so `5` round-trips as `5`, not `5.0`.
fn serialize_score<S: Serializer>(score: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if score.fract() == 0.0 && score.abs() < 1e15 {
        serializer.serialize_i64(*score as i64)
    } else {
        serializer.serialize_f64(*score)
    }
}
