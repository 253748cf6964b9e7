//! Bounded value pools the generator draws attributes from.

pub(crate) const STUDENT_FIRST_NAMES: &[&str] = &[
    "Emma", "Liam", "Olivia", "Noah", "Ava", "Ethan", "Sophia", "Mason", "Isabella", "William",
    "Mia", "James", "Charlotte", "Benjamin", "Amelia",
];

pub(crate) const STUDENT_LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Hernandez", "Lopez", "Gonzalez", "Wilson",
];

pub(crate) const CITIES: &[&str] = &[
    "Vienna", "Salzburg", "Graz", "Innsbruck", "Linz", "Klagenfurt", "Villach", "Wels",
];

pub(crate) const INSTRUCTOR_FIRST_NAMES: &[&str] = &[
    "John", "Sarah", "Michael", "Emily", "David", "Jessica", "Robert", "Lisa", "Daniel",
    "Jennifer", "Thomas", "Maria", "Christopher", "Anna",
];

pub(crate) const INSTRUCTOR_LAST_NAMES: &[&str] = &[
    "Anderson", "Taylor", "Thomas", "Moore", "Jackson", "Martin", "Lee", "Perez", "Thompson",
    "White", "Harris", "Clark", "Lewis", "Walker",
];

pub(crate) const DEPARTMENTS: &[&str] = &[
    "Computer Science",
    "Mathematics",
    "Physics",
    "Chemistry",
    "Biology",
    "Engineering",
    "Business",
    "Arts",
    "History",
    "Literature",
];

pub(crate) const BUILDINGS: &[&str] = &[
    "Building A",
    "Building B",
    "Building C",
    "Main Campus",
    "North Wing",
    "South Wing",
];

pub(crate) const COURSE_PREFIXES: &[&str] = &[
    "Introduction to",
    "Advanced",
    "Fundamentals of",
    "Applied",
    "Theoretical",
    "Practical",
    "Modern",
    "Classical",
];

pub(crate) const COURSE_TOPICS: &[&str] = &[
    "Programming",
    "Algorithms",
    "Data Structures",
    "Web Development",
    "Machine Learning",
    "Database Systems",
    "Networks",
    "Security",
    "Software Engineering",
    "AI",
    "Cloud Computing",
    "Mobile Development",
];

pub(crate) const EMAIL_DOMAIN: &str = "university.edu";
