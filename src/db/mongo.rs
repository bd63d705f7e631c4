use async_trait::async_trait;
use bson::{doc, oid::ObjectId, DateTime as BsonDateTime, Document};
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use log::{info, warn};
use mongodb::{
    error::{ErrorKind, WriteFailure},
    options::{ClientOptions, IndexOptions, ServerApi, ServerApiVersion},
    Client, Collection, Database, IndexModel,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::db::{ItineraryStore, StoreError, UserStore};
use crate::models::{
    itinerary::{Destination, Itinerary, Preferences},
    user::User,
};

const DUPLICATE_KEY: i32 = 11000;

pub async fn create_mongo_client(uri: &str) -> Result<Client, StoreError> {
    let mut client_options = ClientOptions::parse(uri).await?;

    client_options.connect_timeout = Some(Duration::from_secs(10));
    client_options.server_selection_timeout = Some(Duration::from_secs(10));
    client_options.max_pool_size = Some(10);
    client_options.min_pool_size = Some(1);

    let server_api = ServerApi::builder().version(ServerApiVersion::V1).build();
    client_options.server_api = Some(server_api);

    let client = Client::with_options(client_options)?;

    match client
        .database("admin")
        .run_command(doc! {"ping": 1})
        .await
    {
        Ok(_) => info!("Connected to MongoDB and verified with ping"),
        Err(e) => warn!(
            "Connected to MongoDB but ping failed: {}. Requests may fail until it is reachable",
            e
        ),
    }

    Ok(client)
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => {
            write_error.code == DUPLICATE_KEY
        }
        ErrorKind::Command(command_error) => command_error.code == DUPLICATE_KEY,
        _ => false,
    }
}

fn to_bson_time(time: DateTime<Utc>) -> BsonDateTime {
    BsonDateTime::from_millis(time.timestamp_millis())
}

fn from_bson_time(time: BsonDateTime) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(time.timestamp_millis()).unwrap_or_default()
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItineraryDocument {
    #[serde(rename = "_id")]
    trip_id: String,
    user_id: String,
    trip_name: String,
    start_date: String,
    end_date: String,
    created_at: BsonDateTime,
}

impl From<&Itinerary> for ItineraryDocument {
    fn from(itinerary: &Itinerary) -> Self {
        Self {
            trip_id: itinerary.trip_id.clone(),
            user_id: itinerary.user_id.clone(),
            trip_name: itinerary.trip_name.clone(),
            start_date: itinerary.start_date.clone(),
            end_date: itinerary.end_date.clone(),
            created_at: to_bson_time(itinerary.created_at),
        }
    }
}

impl From<ItineraryDocument> for Itinerary {
    fn from(doc: ItineraryDocument) -> Self {
        Self {
            trip_id: doc.trip_id,
            user_id: doc.user_id,
            trip_name: doc.trip_name,
            start_date: doc.start_date,
            end_date: doc.end_date,
            created_at: from_bson_time(doc.created_at),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct PreferencesDocument {
    #[serde(rename = "_id")]
    trip_id: String,
    #[serde(flatten)]
    preferences: Preferences,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DayDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    trip_id: String,
    day_id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DestinationDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    trip_id: String,
    day_id: i64,
    name: String,
    latitude: f64,
    longitude: f64,
    start_time: Option<String>,
    end_time: Option<String>,
    added_at: BsonDateTime,
    // Position within the day, reissued on every move. ObjectIds minted by one
    // process strictly increase, which millisecond timestamps do not.
    seq: ObjectId,
}

impl From<DestinationDocument> for Destination {
    fn from(doc: DestinationDocument) -> Self {
        Self {
            name: doc.name,
            latitude: doc.latitude,
            longitude: doc.longitude,
            start_time: doc.start_time,
            end_time: doc.end_time,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserDocument {
    #[serde(rename = "_id")]
    id: String,
    username: String,
    email: String,
    created_at: BsonDateTime,
    #[serde(default)]
    saved_itineraries: Vec<String>,
}

impl From<&User> for UserDocument {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            created_at: to_bson_time(user.created_at),
            saved_itineraries: user.saved_itineraries.clone(),
        }
    }
}

impl From<UserDocument> for User {
    fn from(doc: UserDocument) -> Self {
        Self {
            id: doc.id,
            username: doc.username,
            email: doc.email,
            created_at: from_bson_time(doc.created_at),
            saved_itineraries: doc.saved_itineraries,
        }
    }
}

/// Itineraries, preferences, days and destinations live in flat collections
/// keyed by trip id; unique indexes carry the per-day name invariant.
pub struct MongoStore {
    database: Database,
}

impl MongoStore {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, StoreError> {
        let client = create_mongo_client(uri).await?;
        let store = Self {
            database: client.database(database),
        };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> Result<(), StoreError> {
        let unique = || IndexOptions::builder().unique(true).build();

        self.days()
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "tripId": 1, "dayId": 1 })
                    .options(unique())
                    .build(),
            )
            .await?;
        self.destinations()
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "tripId": 1, "dayId": 1, "name": 1 })
                    .options(unique())
                    .build(),
            )
            .await?;
        self.destinations()
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "tripId": 1, "dayId": 1, "seq": 1 })
                    .build(),
            )
            .await?;
        self.itineraries()
            .create_index(IndexModel::builder().keys(doc! { "userId": 1 }).build())
            .await?;
        self.users()
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "username": 1 })
                    .options(unique())
                    .build(),
            )
            .await?;

        info!("MongoDB indexes ensured on {}", self.database.name());
        Ok(())
    }

    fn itineraries(&self) -> Collection<ItineraryDocument> {
        self.database.collection("itineraries")
    }

    fn preferences(&self) -> Collection<PreferencesDocument> {
        self.database.collection("preferences")
    }

    fn days(&self) -> Collection<DayDocument> {
        self.database.collection("days")
    }

    fn destinations(&self) -> Collection<DestinationDocument> {
        self.database.collection("destinations")
    }

    fn users(&self) -> Collection<UserDocument> {
        self.database.collection("users")
    }

    async fn insert_or_duplicate<T>(
        collection: Collection<T>,
        record: &T,
        what: String,
    ) -> Result<(), StoreError>
    where
        T: Serialize + Send + Sync,
    {
        match collection.insert_one(record).await {
            Ok(_) => Ok(()),
            Err(err) if is_duplicate_key(&err) => Err(StoreError::Duplicate(what)),
            Err(err) => Err(err.into()),
        }
    }
}

fn destination_filter(trip_id: &str, day_id: i64, name: &str) -> Document {
    doc! { "tripId": trip_id, "dayId": day_id, "name": name }
}

#[async_trait]
impl ItineraryStore for MongoStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.database.run_command(doc! {"ping": 1}).await?;
        Ok(())
    }

    async fn insert_itinerary(&self, itinerary: &Itinerary) -> Result<(), StoreError> {
        Self::insert_or_duplicate(
            self.itineraries(),
            &ItineraryDocument::from(itinerary),
            format!("itinerary {}", itinerary.trip_id),
        )
        .await
    }

    async fn find_itinerary(&self, trip_id: &str) -> Result<Option<Itinerary>, StoreError> {
        let found = self.itineraries().find_one(doc! { "_id": trip_id }).await?;
        Ok(found.map(Itinerary::from))
    }

    async fn list_itineraries(&self, owner: Option<&str>) -> Result<Vec<Itinerary>, StoreError> {
        let filter = match owner {
            Some(user_id) => doc! { "userId": user_id },
            None => doc! {},
        };
        let cursor = self
            .itineraries()
            .find(filter)
            .sort(doc! { "createdAt": -1, "_id": 1 })
            .await?;
        let docs: Vec<ItineraryDocument> = cursor.try_collect().await?;
        Ok(docs.into_iter().map(Itinerary::from).collect())
    }

    async fn delete_itinerary(&self, trip_id: &str) -> Result<(), StoreError> {
        self.itineraries().delete_one(doc! { "_id": trip_id }).await?;
        Ok(())
    }

    async fn put_preferences(
        &self,
        trip_id: &str,
        preferences: &Preferences,
    ) -> Result<(), StoreError> {
        let record = PreferencesDocument {
            trip_id: trip_id.to_string(),
            preferences: preferences.clone(),
        };
        self.preferences()
            .replace_one(doc! { "_id": trip_id }, &record)
            .upsert(true)
            .await?;
        Ok(())
    }

    async fn find_preferences(&self, trip_id: &str) -> Result<Option<Preferences>, StoreError> {
        let found = self.preferences().find_one(doc! { "_id": trip_id }).await?;
        Ok(found.map(|doc| doc.preferences))
    }

    async fn delete_preferences(&self, trip_id: &str) -> Result<(), StoreError> {
        self.preferences().delete_one(doc! { "_id": trip_id }).await?;
        Ok(())
    }

    async fn insert_day(&self, trip_id: &str, day_id: i64) -> Result<(), StoreError> {
        let record = DayDocument {
            id: None,
            trip_id: trip_id.to_string(),
            day_id,
        };
        Self::insert_or_duplicate(self.days(), &record, format!("day {} of {}", day_id, trip_id))
            .await
    }

    async fn day_exists(&self, trip_id: &str, day_id: i64) -> Result<bool, StoreError> {
        let count = self
            .days()
            .count_documents(doc! { "tripId": trip_id, "dayId": day_id })
            .await?;
        Ok(count > 0)
    }

    async fn list_days(&self, trip_id: &str) -> Result<Vec<i64>, StoreError> {
        let cursor = self
            .days()
            .find(doc! { "tripId": trip_id })
            .sort(doc! { "dayId": 1 })
            .await?;
        let docs: Vec<DayDocument> = cursor.try_collect().await?;
        Ok(docs.into_iter().map(|day| day.day_id).collect())
    }

    async fn delete_day(&self, trip_id: &str, day_id: i64) -> Result<(), StoreError> {
        self.days()
            .delete_one(doc! { "tripId": trip_id, "dayId": day_id })
            .await?;
        Ok(())
    }

    async fn insert_destination(
        &self,
        trip_id: &str,
        day_id: i64,
        destination: &Destination,
    ) -> Result<(), StoreError> {
        let record = DestinationDocument {
            id: None,
            trip_id: trip_id.to_string(),
            day_id,
            name: destination.name.clone(),
            latitude: destination.latitude,
            longitude: destination.longitude,
            start_time: destination.start_time.clone(),
            end_time: destination.end_time.clone(),
            added_at: BsonDateTime::now(),
            seq: ObjectId::new(),
        };
        Self::insert_or_duplicate(
            self.destinations(),
            &record,
            format!("destination {} in day {}", destination.name, day_id),
        )
        .await
    }

    async fn find_destination(
        &self,
        trip_id: &str,
        day_id: i64,
        name: &str,
    ) -> Result<Option<Destination>, StoreError> {
        let found = self
            .destinations()
            .find_one(destination_filter(trip_id, day_id, name))
            .await?;
        Ok(found.map(Destination::from))
    }

    async fn list_destinations(
        &self,
        trip_id: &str,
        day_id: i64,
    ) -> Result<Vec<Destination>, StoreError> {
        let cursor = self
            .destinations()
            .find(doc! { "tripId": trip_id, "dayId": day_id })
            .sort(doc! { "seq": 1 })
            .await?;
        let docs: Vec<DestinationDocument> = cursor.try_collect().await?;
        Ok(docs.into_iter().map(Destination::from).collect())
    }

    async fn delete_destination(
        &self,
        trip_id: &str,
        day_id: i64,
        name: &str,
    ) -> Result<(), StoreError> {
        self.destinations()
            .delete_one(destination_filter(trip_id, day_id, name))
            .await?;
        Ok(())
    }

    async fn delete_destinations(&self, trip_id: &str, day_id: i64) -> Result<(), StoreError> {
        self.destinations()
            .delete_many(doc! { "tripId": trip_id, "dayId": day_id })
            .await?;
        Ok(())
    }

    async fn move_destination(
        &self,
        trip_id: &str,
        source_day: i64,
        target_day: i64,
        name: &str,
    ) -> Result<bool, StoreError> {
        // One document update: the record is never absent from both days, and
        // the unique index rejects a name already present in the target day.
        let update = doc! {
            "$set": {
                "dayId": target_day,
                "addedAt": BsonDateTime::now(),
                "seq": ObjectId::new(),
            }
        };
        match self
            .destinations()
            .update_one(destination_filter(trip_id, source_day, name), update)
            .await
        {
            Ok(result) => Ok(result.matched_count > 0),
            Err(err) if is_duplicate_key(&err) => Err(StoreError::Duplicate(format!(
                "destination {} in day {}",
                name, target_day
            ))),
            Err(err) => Err(err.into()),
        }
    }
}

#[async_trait]
impl UserStore for MongoStore {
    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        Self::insert_or_duplicate(
            self.users(),
            &UserDocument::from(user),
            format!("user {} ({})", user.id, user.username),
        )
        .await
    }

    async fn find_user(&self, id: &str) -> Result<Option<User>, StoreError> {
        let found = self.users().find_one(doc! { "_id": id }).await?;
        Ok(found.map(User::from))
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let found = self.users().find_one(doc! { "username": username }).await?;
        Ok(found.map(User::from))
    }

    async fn add_saved_itinerary(
        &self,
        user_id: &str,
        trip_id: &str,
    ) -> Result<Option<User>, StoreError> {
        let found = self
            .users()
            .find_one_and_update(
                doc! { "_id": user_id },
                doc! { "$addToSet": { "savedItineraries": trip_id } },
            )
            .return_document(mongodb::options::ReturnDocument::After)
            .await?;
        Ok(found.map(User::from))
    }

    async fn remove_saved_itinerary(
        &self,
        user_id: &str,
        trip_id: &str,
    ) -> Result<Option<User>, StoreError> {
        let found = self
            .users()
            .find_one_and_update(
                doc! { "_id": user_id },
                doc! { "$pull": { "savedItineraries": trip_id } },
            )
            .return_document(mongodb::options::ReturnDocument::After)
            .await?;
        Ok(found.map(User::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documents_use_client_field_names() {
        let itinerary = Itinerary {
            trip_id: "trip1".to_string(),
            user_id: "u1".to_string(),
            trip_name: "Paris".to_string(),
            start_date: "2024-06-01".to_string(),
            end_date: "2024-06-03".to_string(),
            created_at: Utc::now(),
        };
        let document = bson::to_document(&ItineraryDocument::from(&itinerary)).unwrap();
        assert_eq!(document.get_str("_id").unwrap(), "trip1");
        assert_eq!(document.get_str("userId").unwrap(), "u1");
        assert!(document.get_datetime("createdAt").is_ok());
    }

    #[test]
    fn test_timestamps_survive_conversion_at_millisecond_precision() {
        let now = Utc::now();
        let back = from_bson_time(to_bson_time(now));
        assert_eq!(back.timestamp_millis(), now.timestamp_millis());
    }

    #[test]
    fn test_preferences_are_flattened_next_to_the_trip_id() {
        let record = PreferencesDocument {
            trip_id: "trip1".to_string(),
            preferences: Preferences {
                pace: "fast".to_string(),
                budget: "900".to_string(),
                group: "friends".to_string(),
                interests: vec!["hiking".to_string()],
            },
        };
        let document = bson::to_document(&record).unwrap();
        assert_eq!(document.get_str("pace").unwrap(), "fast");
        assert_eq!(document.get_array("interests").unwrap().len(), 1);
    }
}
