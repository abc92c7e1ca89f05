//! Built-in sample set used to seed demo mode and exercised throughout the tests.

use chrono::{DateTime, NaiveDate, Utc};

use super::domain::{
    AssignedWorker, GeoLocation, ReportId, ReportStatus, Reporter, WasteReport, WasteType,
    Worker, WorkerId, Zone,
};

fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, 0))
        .map(|naive| naive.and_utc())
        .unwrap_or_default()
}

pub fn workers() -> Vec<Worker> {
    [
        ("w-1", "Anita Sharma", "+91-9800000001", Zone::North),
        ("w-2", "Ravi Kumar", "+91-9800000002", Zone::South),
        ("w-3", "Meera Iyer", "+91-9800000003", Zone::East),
        ("w-4", "Arjun Das", "+91-9800000004", Zone::Central),
    ]
    .into_iter()
    .map(|(id, name, phone, zone)| Worker {
        id: WorkerId(id.to_string()),
        name: name.to_string(),
        phone: phone.to_string(),
        email: format!(
            "{}@wastewatch.example",
            name.to_ascii_lowercase().replace(' ', ".")
        ),
        zone,
    })
    .collect()
}

struct SampleRow {
    id: &'static str,
    name: &'static str,
    phone: &'static str,
    latitude: f64,
    longitude: f64,
    address: Option<&'static str>,
    zone: Option<Zone>,
    waste_type: WasteType,
    severity: f32,
    confidence: f32,
    status: ReportStatus,
    worker: Option<(&'static str, &'static str)>,
    notes: Option<&'static str>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

pub fn reports() -> Vec<WasteReport> {
    let rows = [
        SampleRow {
            id: "1",
            name: "Priya Nair",
            phone: "+91-9876543210",
            latitude: 28.6139,
            longitude: 77.2090,
            address: Some("12 MG Road, Sector 4"),
            zone: Some(Zone::North),
            waste_type: WasteType::Organic,
            severity: 7.5,
            confidence: 0.92,
            status: ReportStatus::Pending,
            worker: None,
            notes: None,
            created_at: at(2025, 1, 5, 9, 30),
            updated_at: at(2025, 1, 5, 9, 30),
        },
        SampleRow {
            id: "2",
            name: "Rahul Verma",
            phone: "+91-9123456780",
            latitude: 28.6300,
            longitude: 77.2200,
            address: Some("Lake View Park, Gate 2"),
            zone: Some(Zone::North),
            waste_type: WasteType::Plastic,
            severity: 6.2,
            confidence: 0.81,
            status: ReportStatus::Assigned,
            worker: Some(("w-1", "Anita Sharma")),
            notes: None,
            created_at: at(2025, 1, 12, 14, 5),
            updated_at: at(2025, 1, 13, 8, 0),
        },
        SampleRow {
            id: "3",
            name: "Sunita Rao",
            phone: "+91-9988776655",
            latitude: 28.5200,
            longitude: 77.2100,
            address: Some("Station Road \"Old Market\" corner"),
            zone: Some(Zone::South),
            waste_type: WasteType::Glass,
            severity: 8.4,
            confidence: 0.77,
            status: ReportStatus::InProgress,
            worker: Some(("w-2", "Ravi Kumar")),
            notes: None,
            created_at: at(2025, 2, 3, 11, 45),
            updated_at: at(2025, 2, 4, 10, 15),
        },
        SampleRow {
            id: "4",
            name: "Imran Khan",
            phone: "+91-9012345678",
            latitude: 28.6400,
            longitude: 77.3000,
            address: Some("Civil Hospital back lane"),
            zone: Some(Zone::East),
            waste_type: WasteType::Medical,
            severity: 9.1,
            confidence: 0.95,
            status: ReportStatus::Resolved,
            worker: Some(("w-3", "Meera Iyer")),
            notes: Some("Sharps bin collected and site disinfected"),
            created_at: at(2025, 2, 20, 7, 20),
            updated_at: at(2025, 2, 22, 16, 40),
        },
        SampleRow {
            id: "5",
            name: "Kavya Menon",
            phone: "+91-9090909090",
            latitude: 28.5800,
            longitude: 77.1500,
            address: None,
            zone: None,
            waste_type: WasteType::EWaste,
            severity: 4.0,
            confidence: 0.64,
            status: ReportStatus::Pending,
            worker: None,
            notes: None,
            created_at: at(2025, 3, 1, 18, 10),
            updated_at: at(2025, 3, 1, 18, 10),
        },
        SampleRow {
            id: "6",
            name: "Deepak Singh",
            phone: "+91-9345678123",
            latitude: 28.6000,
            longitude: 77.2300,
            address: Some("Bus Depot, Ring Road"),
            zone: Some(Zone::Central),
            waste_type: WasteType::Mixed,
            severity: 5.5,
            confidence: 0.7,
            status: ReportStatus::Assigned,
            worker: Some(("w-4", "Arjun Das")),
            notes: None,
            created_at: at(2025, 3, 15, 12, 0),
            updated_at: at(2025, 3, 16, 9, 0),
        },
    ];

    rows.into_iter()
        .map(|row| WasteReport {
            id: ReportId(row.id.to_string()),
            reporter: Reporter {
                name: row.name.to_string(),
                phone: row.phone.to_string(),
            },
            location: GeoLocation {
                latitude: row.latitude,
                longitude: row.longitude,
                address: row.address.map(str::to_string),
                zone: row.zone,
            },
            waste_type: row.waste_type,
            severity: row.severity,
            confidence: row.confidence,
            description: None,
            photo: None,
            status: row.status,
            assigned_worker: row.worker.map(|(id, name)| AssignedWorker {
                id: WorkerId(id.to_string()),
                name: name.to_string(),
            }),
            completion_notes: row.notes.map(str::to_string),
            submitted_by: None,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
        .collect()
}
