//! Bundled sample posts used when every source is unreachable.

use crate::models::Post;

struct Sample {
    id: &'static str,
    title: &'static str,
    slug: &'static str,
    excerpt: &'static str,
    content: &'static str,
    author: &'static str,
    date: &'static str,
    read_time: &'static str,
    categories: &'static [&'static str],
    featured_image: &'static str,
    featured: bool,
}

const SAMPLES: &[Sample] = &[
    Sample {
        id: "1",
        title: "Getting Started with React Hooks",
        slug: "getting-started-with-react-hooks",
        excerpt: "Learn how to use React Hooks to simplify your functional components.",
        content: "# Getting Started with React Hooks\n\nReact Hooks let you use state and other React features without writing a class component.\n\n## useState Hook\n\nThe `useState` hook lets you add state to functional components.\n\n## useEffect Hook\n\nThe `useEffect` hook lets you perform side effects in function components.",
        author: "Jane Developer",
        date: "2023-03-15",
        read_time: "8 min read",
        categories: &["React", "JavaScript", "Frontend"],
        featured_image: "/images/react-hooks.jpg",
        featured: true,
    },
    Sample {
        id: "2",
        title: "Building a Blog with Next.js",
        slug: "building-a-blog-with-nextjs",
        excerpt: "A comprehensive guide to creating a high-performance blog using Next.js.",
        content: "# Building a Blog with Next.js\n\nNext.js is a React framework that makes building websites easier.\n\n## Setting Up Your Project\n\n```bash\nnpx create-next-app my-blog\ncd my-blog\nnpm run dev\n```\n\n## Creating Blog Posts\n\nWe'll use Markdown for our blog posts, which allows for rich content formatting.",
        author: "Sam Tech",
        date: "2023-04-21",
        read_time: "12 min read",
        categories: &["Next.js", "React", "Web Development"],
        featured_image: "/images/nextjs-blog.jpg",
        featured: true,
    },
    Sample {
        id: "3",
        title: "CSS Grid Layout: A Complete Guide",
        slug: "css-grid-layout-complete-guide",
        excerpt: "Master CSS Grid Layout with this comprehensive guide for web developers.",
        content: "# CSS Grid Layout: A Complete Guide\n\nCSS Grid Layout is a two-dimensional grid system.\n\n## Basic Grid Container\n\n```css\n.grid-container {\n  display: grid;\n  grid-template-columns: repeat(3, 1fr);\n  grid-gap: 20px;\n}\n```",
        author: "Alex Designer",
        date: "2023-05-10",
        read_time: "10 min read",
        categories: &["CSS", "Web Design", "Frontend"],
        featured_image: "/images/css-grid.jpg",
        featured: false,
    },
    Sample {
        id: "4",
        title: "TypeScript for JavaScript Developers",
        slug: "typescript-for-javascript-developers",
        excerpt: "Learn how TypeScript can improve your JavaScript development workflow.",
        content: "# TypeScript for JavaScript Developers\n\nTypeScript adds static typing to JavaScript.\n\n## Interfaces\n\n```typescript\ninterface User {\n  name: string;\n  id: number;\n  email?: string;\n}\n```",
        author: "Taylor Programmer",
        date: "2023-06-02",
        read_time: "15 min read",
        categories: &["TypeScript", "JavaScript", "Programming"],
        featured_image: "/images/typescript.jpg",
        featured: false,
    },
    Sample {
        id: "5",
        title: "Responsive Design Best Practices",
        slug: "responsive-design-best-practices",
        excerpt: "Essential techniques for creating websites that work well on all devices.",
        content: "# Responsive Design Best Practices\n\nResponsive web design ensures your website works on any device size.\n\n## Flexible Images\n\n```css\nimg {\n  max-width: 100%;\n  height: auto;\n}\n```\n\n## Mobile-First Approach\n\nDesign for mobile first, then enhance for larger screens.",
        author: "Morgan UX",
        date: "2023-06-15",
        read_time: "9 min read",
        categories: &["CSS", "Responsive Design", "Web Development"],
        featured_image: "/images/responsive-design.jpg",
        featured: false,
    },
];

impl From<&Sample> for Post {
    fn from(s: &Sample) -> Self {
        Post {
            id: s.id.to_string(),
            title: s.title.to_string(),
            slug: s.slug.to_string(),
            author: s.author.to_string(),
            date: s.date.to_string(),
            excerpt: s.excerpt.to_string(),
            content: s.content.to_string(),
            categories: s.categories.iter().map(|c| c.to_string()).collect(),
            featured_image: s.featured_image.to_string(),
            read_time: s.read_time.to_string(),
            featured: s.featured,
            load: true,
        }
    }
}

/// All bundled sample posts.
pub fn sample_posts() -> Vec<Post> {
    SAMPLES.iter().map(Post::from).collect()
}
