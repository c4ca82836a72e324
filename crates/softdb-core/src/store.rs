//! Repository traits — the call contract between storage backends
//! (e.g. `softdb-store-sqlite`) and their consumers (`softdb-api`).
//!
//! Every operation is asynchronous and fails with a backend error that
//! implements [`Classify`], so the consumer can tell a missing row from a
//! duplicate key or a dead connection.

use std::future::Future;

use crate::{
  Classify,
  application::{Application, NewApplication},
  license::{License, NewLicense},
  room::{NewRoom, Room},
  subject::{NewSubject, Subject},
};

/// Bounds shared by every repository error type.
pub trait RepositoryError:
  Classify + std::error::Error + Send + Sync + 'static
{
}

impl<E> RepositoryError for E where
  E: Classify + std::error::Error + Send + Sync + 'static
{
}

// ─── Subjects ────────────────────────────────────────────────────────────────

pub trait SubjectRepository: Send + Sync {
  type Error: RepositoryError;

  /// Persist a subject and an edge from each of its declared parents.
  /// Every parent must already exist.
  fn store_subject(
    &self,
    subject: NewSubject,
  ) -> impl Future<Output = Result<Subject, Self::Error>> + Send + '_;

  /// Case-insensitive lookup. `parents` holds the full ancestor closure,
  /// starting with the subject itself.
  fn get_subject_by_name<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Subject, Self::Error>> + Send + 'a;

  /// Every subject, each resolved as by [`Self::get_subject_by_name`].
  fn get_all_subjects(
    &self,
  ) -> impl Future<Output = Result<Vec<Subject>, Self::Error>> + Send + '_;

  /// Make `parent_name` an immediate parent of `child_name`.
  fn add_child<'a>(
    &'a self,
    parent_name: &'a str,
    child_name: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// `root_name` followed by every subject below it.
  fn get_all_descendant_subjects<'a>(
    &'a self,
    root_name: &'a str,
  ) -> impl Future<Output = Result<Vec<Subject>, Self::Error>> + Send + 'a;
}

// ─── Rooms ───────────────────────────────────────────────────────────────────

pub trait RoomRepository: Send + Sync {
  type Error: RepositoryError;

  fn store_room(
    &self,
    room: NewRoom,
  ) -> impl Future<Output = Result<Room, Self::Error>> + Send + '_;

  fn get_room_by_address<'a>(
    &'a self,
    address: &'a str,
  ) -> impl Future<Output = Result<Room, Self::Error>> + Send + 'a;

  fn get_all_rooms(
    &self,
  ) -> impl Future<Output = Result<Vec<Room>, Self::Error>> + Send + '_;
}

// ─── Applications ────────────────────────────────────────────────────────────

pub trait ApplicationRepository: Send + Sync {
  type Error: RepositoryError;

  /// Persist an application and link it to each listed room.
  fn store_application(
    &self,
    application: NewApplication,
  ) -> impl Future<Output = Result<Application, Self::Error>> + Send + '_;

  fn add_application_to_room<'a>(
    &'a self,
    application_name: &'a str,
    room_address: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// The application with its rooms resolved.
  fn get_application_by_name<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Application, Self::Error>> + Send + 'a;

  fn get_all_applications(
    &self,
  ) -> impl Future<Output = Result<Vec<Application>, Self::Error>> + Send + '_;

  fn get_all_application_names(
    &self,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;
}

// ─── Licenses ────────────────────────────────────────────────────────────────

pub trait LicenseRepository: Send + Sync {
  type Error: RepositoryError;

  /// Persist a license, its application links and its tag values.
  ///
  /// Fails before writing anything if the license names no application.
  fn store_license(
    &self,
    license: NewLicense,
  ) -> impl Future<Output = Result<License, Self::Error>> + Send + '_;

  fn add_application_to_license<'a>(
    &'a self,
    application_name: &'a str,
    license_id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  fn get_license(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<License, Self::Error>> + Send + '_;

  /// Every license with applications and tags folded in, in id order.
  fn get_all_licenses(
    &self,
  ) -> impl Future<Output = Result<Vec<License>, Self::Error>> + Send + '_;
}

// ─── Composition ─────────────────────────────────────────────────────────────

/// The full set of repositories a front end needs, wired together by the
/// backend.
pub trait Catalog: Send + Sync {
  type Subjects: SubjectRepository;
  type Rooms: RoomRepository;
  type Applications: ApplicationRepository;
  type Licenses: LicenseRepository;

  fn subjects(&self) -> &Self::Subjects;
  fn rooms(&self) -> &Self::Rooms;
  fn applications(&self) -> &Self::Applications;
  fn licenses(&self) -> &Self::Licenses;
}
