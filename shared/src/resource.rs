//! Backend collections managed from the console.
//!
//! The session core does not know their record shapes; views receive raw JSON.

use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdminResource {
    Blog,
    Activities,
    TeamMembers,
    Testimonials,
    VolunteerApplications,
    VolunteerOpportunities,
    AboutUs,
    Slides,
    ContactInfo,
    Messages,
}

impl AdminResource {
    pub const ALL: [AdminResource; 10] = [
        AdminResource::Blog,
        AdminResource::Activities,
        AdminResource::TeamMembers,
        AdminResource::Testimonials,
        AdminResource::VolunteerApplications,
        AdminResource::VolunteerOpportunities,
        AdminResource::AboutUs,
        AdminResource::Slides,
        AdminResource::ContactInfo,
        AdminResource::Messages,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            AdminResource::Blog => "/api/blog",
            AdminResource::Activities => "/api/activities",
            AdminResource::TeamMembers => "/api/teamMembers",
            AdminResource::Testimonials => "/api/testimonials",
            AdminResource::VolunteerApplications => "/api/volunteer-applications",
            AdminResource::VolunteerOpportunities => "/api/volunteer-opportunities",
            AdminResource::AboutUs => "/api/about-us",
            AdminResource::Slides => "/api/slides",
            AdminResource::ContactInfo => "/api/contact-info",
            AdminResource::Messages => "/api/messages",
        }
    }

    /// Path of a single record, e.g. `/api/blog/65f0`.
    pub fn item_path(&self, id: &str) -> String {
        format!("{}/{}", self.path(), id.trim_matches('/'))
    }

    pub fn label(&self) -> &'static str {
        match self {
            AdminResource::Blog => "Blog Posts",
            AdminResource::Activities => "Activities",
            AdminResource::TeamMembers => "Team Members",
            AdminResource::Testimonials => "Testimonials",
            AdminResource::VolunteerApplications => "Volunteer Applications",
            AdminResource::VolunteerOpportunities => "Volunteer Opportunities",
            AdminResource::AboutUs => "About Us",
            AdminResource::Slides => "Slides",
            AdminResource::ContactInfo => "Contact Info",
            AdminResource::Messages => "Messages",
        }
    }

    /// Number of records in a collection response.
    ///
    /// Arrays count their elements, a single object counts as one record
    /// (singleton resources such as about-us), and `null` counts as none.
    /// Objects wrapping an array under `data` are unwrapped first.
    pub fn record_count(body: &Value) -> usize {
        match body {
            Value::Array(items) => items.len(),
            Value::Object(map) => match map.get("data") {
                Some(Value::Array(items)) => items.len(),
                _ => 1,
            },
            Value::Null => 0,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn every_resource_lives_under_api() {
        for resource in AdminResource::ALL {
            assert!(resource.path().starts_with("/api/"), "{:?}", resource);
        }
    }

    #[test]
    fn item_path_joins_id() {
        assert_eq!(AdminResource::Blog.item_path("65f0"), "/api/blog/65f0");
        assert_eq!(AdminResource::Slides.item_path("/abc/"), "/api/slides/abc");
    }

    #[test]
    fn record_count_shapes() {
        assert_eq!(AdminResource::record_count(&json!([{"a": 1}, {"a": 2}])), 2);
        assert_eq!(AdminResource::record_count(&json!({"title": "About"})), 1);
        assert_eq!(AdminResource::record_count(&json!({"data": [1, 2, 3]})), 3);
        assert_eq!(AdminResource::record_count(&Value::Null), 0);
    }
}
