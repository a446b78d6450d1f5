//! Sortable column allow-lists for the media catalog entities.

use crate::model::EntityModel;

pub const MOVIE: EntityModel = EntityModel::new(
    "catalog::movie",
    &[
        "id",
        "title",
        "likeCount",
        "dislikeCount",
        "createdAt",
        "updatedAt",
        "version",
    ],
);

pub const DIRECTOR: EntityModel = EntityModel::new(
    "catalog::director",
    &["id", "name", "dob", "nationality", "createdAt", "updatedAt"],
);

pub const GENRE: EntityModel = EntityModel::new("catalog::genre", &["id", "name", "createdAt"]);

// Credentials and role columns are never sortable.
pub const USER: EntityModel = EntityModel::new("catalog::user", &["id", "email", "createdAt"]);
