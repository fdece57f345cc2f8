use crate::models::{ContentId, ContentItem};
use chrono::NaiveDate;
use once_cell::sync::Lazy;

struct BundledPost {
    id: u64,
    date: (i32, u32, u32),
    slug: &'static str,
    title: &'static str,
    excerpt: &'static str,
    body_html: &'static str,
    image: &'static str,
    author: &'static str,
    categories: [&'static str; 2],
    reading_minutes: u32,
}

const POSTS: [BundledPost; 3] = [
    BundledPost {
        id: 1,
        date: (2025, 8, 2),
        slug: "safe-trusted-school-bus-services-for-your-child",
        title: "Safe & Trusted School Bus Services for Your Child",
        excerpt: "Discover why Amogh Van/Bus Services is Mumbai's trusted choice for safe, reliable school transportation. Professional drivers, GPS tracking, and genuine care for your child's safety.",
        body_html: r#"<p>At Amogh Van/Bus Services, the safety and comfort of your children is our top priority. We understand that choosing the right transportation service for your child is one of the most important decisions a parent can make.</p>
<h2>Why Choose Amogh Van/Bus Services?</h2>
<h3>Safety First</h3>
<ul>
<li>All our drivers are professionally trained and background-checked</li>
<li>Regular vehicle maintenance and safety inspections</li>
<li>GPS tracking for real-time location monitoring</li>
<li>First aid trained staff on board</li>
</ul>
<h3>Reliable Service</h3>
<ul>
<li>Punctual pickup and drop-off times</li>
<li>Consistent routes and schedules</li>
<li>Weather contingency plans</li>
<li>Direct communication with parents</li>
</ul>
<h3>Comfortable Experience</h3>
<ul>
<li>Clean, well-maintained vehicles</li>
<li>Age-appropriate seating arrangements</li>
<li>Friendly, caring staff</li>
<li>Smooth ride quality</li>
</ul>
<h2>Our Commitment to Mumbai Families</h2>
<p>Serving the Prabhadevi, Dadar West area and surrounding communities, we've built our reputation on trust, reliability, and genuine care for every child we transport.</p>
<blockquote>
<p>"We don't just provide transportation - we provide peace of mind for parents and a safe, fun journey for children."</p>
<cite>- Rajesh Kumar J Kharwar, Founder</cite>
</blockquote>
<h2>Ready to Get Started?</h2>
<p>Contact us today to learn more about our services and schedule a consultation. We're here to make your child's daily commute safe, reliable, and stress-free.</p>
<p><strong>Phone:</strong> 9870525637 / 9321025627<br>
<strong>Email:</strong> kharwaramog02@gmail.com<br>
<strong>Location:</strong> Prabhadevi, Dadar West, Mumbai</p>"#,
        image: "https://images.unsplash.com/photo-1544620347-c4fd4a3d5957?w=800&h=400&fit=crop",
        author: "Rajesh Kumar J Kharwar",
        categories: ["Safety", "Services"],
        reading_minutes: 3,
    },
    BundledPost {
        id: 2,
        date: (2025, 1, 15),
        slug: "school-bus-safety-tips-for-parents",
        title: "Essential School Bus Safety Tips for Parents",
        excerpt: "Learn essential school bus safety tips to ensure your child's safe daily commute. From waiting at the bus stop to proper boarding procedures.",
        body_html: r#"<p>As a parent, ensuring your child's safety during their daily commute to school is paramount. Here are essential safety tips to help prepare your child for safe school bus transportation.</p>
<h2>Before the Bus Arrives</h2>
<ul>
<li>Teach your child to wait for the bus in a safe location, away from traffic</li>
<li>Arrive at the bus stop 5 minutes early</li>
<li>Stay back at least 6 feet from the curb</li>
<li>Never let young children wait alone</li>
</ul>
<h2>Getting On and Off the Bus</h2>
<ul>
<li>Wait until the bus comes to a complete stop</li>
<li>Use handrails when boarding</li>
<li>Take a seat immediately</li>
<li>Exit carefully and move away from the bus quickly</li>
</ul>
<h2>On the Bus</h2>
<ul>
<li>Stay seated at all times</li>
<li>Keep aisles clear of bags and feet</li>
<li>Follow the driver's instructions</li>
<li>Use quiet voices to avoid distracting the driver</li>
</ul>
<p>At Amogh Van/Bus Services, we reinforce these safety practices daily and ensure our staff is trained to guide children in safe boarding and riding practices.</p>"#,
        image: "https://images.unsplash.com/photo-1571019613454-1cb2f99b2d8b?w=800&h=400&fit=crop",
        author: "Amogh Van Services Team",
        categories: ["Safety", "Tips"],
        reading_minutes: 2,
    },
    BundledPost {
        id: 3,
        date: (2025, 1, 10),
        slug: "introducing-gps-tracking-system",
        title: "Introducing Our New GPS Tracking System",
        excerpt: "Amogh Van/Bus Services introduces GPS tracking for enhanced safety and real-time location monitoring of your child's daily commute.",
        body_html: r#"<p>We're excited to announce the launch of our new GPS tracking system, providing parents with real-time visibility into their child's transportation journey.</p>
<h2>What This Means for You</h2>
<ul>
<li>Real-time location updates of your child's bus</li>
<li>Estimated arrival times at pickup and drop-off points</li>
<li>Route optimization for faster, safer journeys</li>
<li>Emergency response capabilities</li>
</ul>
<h2>How It Works</h2>
<p>Our GPS system automatically tracks each vehicle's location and sends updates to our monitoring center. Parents can request location updates by calling our office during service hours.</p>
<p>This investment in technology demonstrates our continued commitment to providing the safest, most reliable transportation service for Mumbai families.</p>"#,
        image: "https://images.unsplash.com/photo-1551288049-bebda4e38f71?w=800&h=400&fit=crop",
        author: "Rajesh Kumar J Kharwar",
        categories: ["Technology", "Updates"],
        reading_minutes: 2,
    },
];

static BUNDLED: Lazy<Vec<ContentItem>> = Lazy::new(|| POSTS.iter().map(to_item).collect());

fn to_item(post: &BundledPost) -> ContentItem {
    let (year, month, day) = post.date;
    ContentItem {
        id: ContentId::Numeric(post.id),
        slug: post.slug.to_string(),
        title: post.title.to_string(),
        excerpt: post.excerpt.to_string(),
        body_html: post.body_html.to_string(),
        published_at: NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|d| d.and_utc()),
        author_name: Some(post.author.to_string()),
        categories: post.categories.iter().map(|c| c.to_string()).collect(),
        featured_image_url: Some(post.image.to_string()),
        estimated_reading_minutes: post.reading_minutes,
        link: None,
    }
}

/// Posts shipped with the binary, newest first.
pub fn bundled_posts() -> &'static [ContentItem] {
    &BUNDLED
}

pub fn bundled_post(slug: &str) -> Option<ContentItem> {
    BUNDLED.iter().find(|post| post.slug == slug).cloned()
}
